//! Connectivity check command.

use console::style;

use crate::config::Settings;
use crate::nlp::NerClient;
use crate::store::DocumentStoreClient;

/// Probe the document store and the NLP service and report availability.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    let store = DocumentStoreClient::new(settings.store.clone());
    println!(
        "{} Checking document store at {}",
        style("→").cyan(),
        settings.store.endpoint
    );
    if store.ping().await {
        println!(
            "  {} Container reachable ({}/{})",
            style("✓").green(),
            settings.store.database,
            settings.store.container
        );
    } else {
        println!("  {} Store unreachable", style("✗").red());
    }

    let ner = NerClient::new(settings.nlp.clone());
    println!(
        "{} Checking NLP service at {}",
        style("→").cyan(),
        settings.nlp.endpoint
    );
    if !ner.is_available().await {
        println!("  {} NLP service unreachable", style("✗").red());
        return Ok(());
    }
    match ner.list_models().await {
        Ok(models) if models.iter().any(|m| m == &settings.nlp.model) => {
            println!(
                "  {} Model available: {}",
                style("✓").green(),
                settings.nlp.model
            );
        }
        Ok(_) => {
            println!(
                "  {} Service up, but model {} is not pulled",
                style("!").yellow(),
                settings.nlp.model
            );
        }
        Err(e) => {
            println!("  {} Could not list models: {}", style("✗").red(), e);
        }
    }

    Ok(())
}
