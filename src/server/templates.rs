//! HTML templates for the extraction playground.

use crate::models::EntitySpan;
use crate::utils::html_escape;

/// Sample game description pre-filled into the text area.
pub const SAMPLE_TEXT: &str = "Cyberpunk 2077 is an open-world action RPG set in \
Night City, a megalopolis obsessed with power and glamour. It was developed by \
CD Projekt Red and released for PlayStation 5, Xbox Series and PC.";

/// Base HTML template shared by all pages.
pub fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - GameVault</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <header id="main-header">
        <nav>
            <a href="/" class="logo">GameVault</a>
        </nav>
    </header>
    <main>
        <h1>{title}</h1>
        {content}
    </main>
</body>
</html>"#,
        title = html_escape(title),
        content = content
    )
}

/// The text input form, pre-filled with the given text.
fn input_form(text: &str) -> String {
    format!(
        r#"
    <form method="post" action="/extract" class="extract-form">
        <label for="text">Paste the game description here:</label>
        <textarea id="text" name="text" rows="10">{}</textarea>
        <button type="submit">Extract entities</button>
    </form>
    "#,
        html_escape(text)
    )
}

/// Render the extractor landing page.
pub fn extractor_page(text: &str) -> String {
    let content = format!(
        r#"
    <p class="intro">This tool uses an NLP model to identify and extract named
    entities (product names, organizations, places, and so on) from a text.</p>
    {}
    "#,
        input_form(text)
    );
    base_template("Named Entity Extractor", &content)
}

/// Render the results page: the form (with the submitted text) plus either
/// the entity table or the "no entities" notice.
pub fn results_page(text: &str, entities: &[EntitySpan]) -> String {
    let results = if entities.is_empty() {
        r#"<p class="notice">No entities found in the provided text.</p>"#.to_string()
    } else {
        entity_table(entities)
    };

    let content = format!(
        r#"
    {}
    <section class="results">
        <h2>Entities found</h2>
        {}
    </section>
    "#,
        input_form(text),
        results
    );
    base_template("Named Entity Extractor", &content)
}

/// Two-column table of (text, label) pairs, one row per span.
fn entity_table(entities: &[EntitySpan]) -> String {
    let mut rows = String::new();
    for span in entities {
        rows.push_str(&format!(
            r#"
            <tr class="entity-row">
                <td>{}</td>
                <td>{}</td>
            </tr>
            "#,
            html_escape(&span.text),
            html_escape(&span.label)
        ));
    }

    format!(
        r#"
    <table class="entity-listing">
        <thead>
            <tr>
                <th>Text</th>
                <th>Label</th>
            </tr>
        </thead>
        <tbody>
            {}
        </tbody>
    </table>
    "#,
        rows
    )
}

/// Render an error panel when the model call fails.
pub fn error_page(message: &str) -> String {
    let content = format!(
        r#"<p class="error">Extraction failed: {}</p>
    <p><a href="/">Back to the extractor</a></p>"#,
        html_escape(message)
    );
    base_template("Named Entity Extractor", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_table_one_row_per_span() {
        let spans = vec![
            EntitySpan::new("Night City", "LOC"),
            EntitySpan::new("CD Projekt Red", "ORG"),
            EntitySpan::new("PC", "PRODUCT"),
        ];
        let html = entity_table(&spans);
        assert_eq!(html.matches("entity-row").count(), 3);
        assert!(html.contains("<td>Night City</td>"));
        assert!(html.contains("<td>PRODUCT</td>"));
    }

    #[test]
    fn test_results_page_notice_when_empty() {
        let html = results_page("some text", &[]);
        assert!(html.contains("No entities found"));
        assert!(!html.contains("entity-row"));
    }

    #[test]
    fn test_templates_escape_user_text() {
        let html = results_page(
            "<script>alert(1)</script>",
            &[EntitySpan::new("<b>", "MISC")],
        );
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<td>&lt;b&gt;</td>"));
    }

    #[test]
    fn test_extractor_page_prefills_sample() {
        let html = extractor_page(SAMPLE_TEXT);
        assert!(html.contains("<textarea"));
        assert!(html.contains("Cyberpunk 2077"));
    }
}
