//! NLP client for named-entity extraction.
//!
//! Talks to an external model server (Ollama API) for inference. The model
//! itself stays external; this module only prompts it and parses the reply
//! into entity spans.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::EntitySpan;

/// Default prompt for entity extraction. `{text}` is replaced with the
/// user's input.
pub const DEFAULT_ENTITIES_PROMPT: &str = r#"You are a named-entity recognizer. Identify every named entity in the text below and classify it.

Allowed labels: PERSON, ORG, LOC, PRODUCT, EVENT, DATE, MISC.

Rules:
1. Output one entity per line in the form: text | LABEL
2. Copy the entity text verbatim from the input.
3. Preserve the order in which entities appear.
4. If the text contains no named entities, respond with exactly: NONE
5. No preamble, no explanations, no extra formatting.

Text:
{text}"#;

/// Configuration for the NLP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    /// Whether entity extraction is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model server endpoint (default: http://localhost:11434)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model to use for extraction
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Custom extraction prompt (uses the {text} placeholder)
    #[serde(default)]
    pub entities_prompt: Option<String>,
    /// Maximum characters of input text to send to the model
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_enabled() -> bool {
    true
}
fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "llama3.2:instruct".to_string()
}
fn default_max_tokens() -> u32 {
    512
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_content_chars() -> usize {
    8000
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            entities_prompt: None,
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl NerConfig {
    /// Get the extraction prompt, using custom or default.
    pub fn get_entities_prompt(&self) -> &str {
        self.entities_prompt
            .as_deref()
            .unwrap_or(DEFAULT_ENTITIES_PROMPT)
    }
}

/// Errors that can occur during entity extraction.
#[derive(Debug, Error)]
pub enum NerError {
    #[error("NLP connection error: {0}")]
    Connection(String),

    #[error("NLP API error: {0}")]
    Api(String),

    #[error("NLP response parse error: {0}")]
    Parse(String),

    #[error("Entity extraction is disabled")]
    Disabled,
}

/// Model server request format.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

/// Model server response format.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

/// NLP client for entity extraction. Built once at startup and shared;
/// there is no per-request model loading.
pub struct NerClient {
    config: NerConfig,
    client: Client,
}

impl NerClient {
    /// Create a new NLP client with the given configuration.
    pub fn new(config: NerConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Get the config.
    pub fn config(&self) -> &NerConfig {
        &self.config
    }

    /// Check if the model server is reachable.
    pub async fn is_available(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        let url = format!("{}/api/tags", self.config.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// List models available on the server.
    pub async fn list_models(&self) -> Result<Vec<String>, NerError> {
        let url = format!("{}/api/tags", self.config.endpoint);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NerError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NerError::Api(format!("HTTP {}", resp.status())));
        }

        #[derive(Deserialize)]
        struct TagsResponse {
            models: Vec<ModelInfo>,
        }

        #[derive(Deserialize)]
        struct ModelInfo {
            name: String,
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| NerError::Parse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Extract entity spans from the given text.
    ///
    /// Zero entities is a normal result, not an error.
    pub async fn extract_entities(&self, text: &str) -> Result<Vec<EntitySpan>, NerError> {
        if !self.config.enabled {
            return Err(NerError::Disabled);
        }

        let truncated = self.truncate_content(text);
        let prompt = self
            .config
            .get_entities_prompt()
            .replace("{text}", truncated);

        debug!("Extracting entities from {} bytes of input", truncated.len());
        let response = self.call_generate(&prompt).await?;

        Ok(self.parse_entities(truncated, &response))
    }

    /// Truncate input to the configured maximum (UTF-8 safe).
    fn truncate_content<'a>(&self, text: &'a str) -> &'a str {
        if text.len() <= self.config.max_content_chars {
            return text;
        }
        let mut end = self.config.max_content_chars;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }

    /// Call the model server with a prompt.
    async fn call_generate(&self, prompt: &str) -> Result<String, NerError> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NerError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(NerError::Api(format!("HTTP {}: {}", status, body)));
        }

        let generate_resp: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| NerError::Parse(e.to_string()))?;

        Ok(generate_resp.response)
    }

    /// Parse `text | LABEL` lines from the model response into spans.
    ///
    /// Lines that are malformed, empty, or whose text does not occur in the
    /// input are dropped. Order and repeats are kept as the model emitted
    /// them.
    fn parse_entities(&self, input: &str, response: &str) -> Vec<EntitySpan> {
        response
            .lines()
            .filter_map(|line| {
                let line = strip_list_marker(line.trim());
                if line.is_empty() || line.eq_ignore_ascii_case("none") {
                    return None;
                }

                let (text, label) = line.split_once('|')?;
                let text = text.trim();
                let label: String = label
                    .trim()
                    .to_uppercase()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .collect();

                if text.is_empty() || text.len() > 200 || label.is_empty() || label.len() > 32 {
                    return None;
                }
                // Spans must be substrings of the input
                if !input.contains(text) {
                    return None;
                }

                Some(EntitySpan::new(text, label))
            })
            .collect()
    }
}

/// Strip a leading bullet or `1.` / `1)` list marker, if present.
fn strip_list_marker(line: &str) -> &str {
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim_start();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const SAMPLE: &str = "Cyberpunk 2077 is an open-world RPG set in Night City, \
        developed by CD Projekt Red and released in 2020.";

    #[test]
    fn test_parse_entities_basic() {
        let client = NerClient::new(NerConfig::default());
        let spans = client.parse_entities(
            SAMPLE,
            "Cyberpunk 2077 | PRODUCT\nNight City | LOC\nCD Projekt Red | ORG\n2020 | DATE",
        );
        assert_eq!(
            spans,
            vec![
                EntitySpan::new("Cyberpunk 2077", "PRODUCT"),
                EntitySpan::new("Night City", "LOC"),
                EntitySpan::new("CD Projekt Red", "ORG"),
                EntitySpan::new("2020", "DATE"),
            ]
        );
    }

    #[test]
    fn test_parse_entities_list_markers_and_case() {
        let client = NerClient::new(NerConfig::default());
        let spans = client.parse_entities(
            SAMPLE,
            "- Night City | loc\n* CD Projekt Red | Org\n1. Cyberpunk 2077 | product",
        );
        assert_eq!(
            spans,
            vec![
                EntitySpan::new("Night City", "LOC"),
                EntitySpan::new("CD Projekt Red", "ORG"),
                EntitySpan::new("Cyberpunk 2077", "PRODUCT"),
            ]
        );
    }

    #[test]
    fn test_parse_entities_none_response() {
        let client = NerClient::new(NerConfig::default());
        assert!(client.parse_entities(SAMPLE, "NONE").is_empty());
        assert!(client.parse_entities(SAMPLE, "none\n").is_empty());
        assert!(client.parse_entities(SAMPLE, "").is_empty());
    }

    #[test]
    fn test_parse_entities_drops_invented_spans() {
        let client = NerClient::new(NerConfig::default());
        // "Warsaw" is not in the input, so it must be dropped
        let spans = client.parse_entities(SAMPLE, "Warsaw | LOC\nNight City | LOC");
        assert_eq!(spans, vec![EntitySpan::new("Night City", "LOC")]);
    }

    #[test]
    fn test_parse_entities_skips_malformed_lines() {
        let client = NerClient::new(NerConfig::default());
        let spans = client.parse_entities(
            SAMPLE,
            "Here are the entities:\nNight City | LOC\n| ORG\nCD Projekt Red |",
        );
        assert_eq!(spans, vec![EntitySpan::new("Night City", "LOC")]);
    }

    #[test]
    fn test_parse_entities_keeps_repeats_in_order() {
        let client = NerClient::new(NerConfig::default());
        let spans =
            client.parse_entities(SAMPLE, "Night City | LOC\nNight City | LOC");
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_strip_list_marker_leaves_numeric_entities() {
        // A span starting with digits is not a list marker
        assert_eq!(strip_list_marker("2020 | DATE"), "2020 | DATE");
        assert_eq!(strip_list_marker("3. 2020 | DATE"), "2020 | DATE");
    }

    #[test]
    fn test_default_config() {
        let config = NerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert!(config.entities_prompt.is_none());
        assert!(config.get_entities_prompt().contains("{text}"));
    }

    #[tokio::test]
    async fn test_extract_entities_round_trip() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .json_body_includes(r#"{"model": "llama3.2:instruct", "stream": false}"#);
            then.status(200).json_body(serde_json::json!({
                "response": "Night City | LOC\nCD Projekt Red | ORG",
                "done": true,
            }));
        });

        let config = NerConfig {
            endpoint: server.base_url(),
            ..Default::default()
        };
        let spans = NerClient::new(config)
            .extract_entities(SAMPLE)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(
            spans,
            vec![
                EntitySpan::new("Night City", "LOC"),
                EntitySpan::new("CD Projekt Red", "ORG"),
            ]
        );
    }

    #[tokio::test]
    async fn test_extract_entities_no_entities() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(200)
                .json_body(serde_json::json!({"response": "NONE", "done": true}));
        });

        let config = NerConfig {
            endpoint: server.base_url(),
            ..Default::default()
        };
        let spans = NerClient::new(config)
            .extract_entities("nothing notable here")
            .await
            .unwrap();
        assert!(spans.is_empty());
    }

    #[tokio::test]
    async fn test_extract_entities_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(500).body("model exploded");
        });

        let config = NerConfig {
            endpoint: server.base_url(),
            ..Default::default()
        };
        let err = NerClient::new(config)
            .extract_entities(SAMPLE)
            .await
            .unwrap_err();
        assert!(matches!(err, NerError::Api(_)));
    }

    #[tokio::test]
    async fn test_extract_entities_disabled() {
        let config = NerConfig {
            enabled: false,
            ..Default::default()
        };
        let err = NerClient::new(config)
            .extract_entities(SAMPLE)
            .await
            .unwrap_err();
        assert!(matches!(err, NerError::Disabled));
    }

    #[test]
    fn test_truncate_content_utf8_boundary() {
        let config = NerConfig {
            max_content_chars: 5,
            ..Default::default()
        };
        let client = NerClient::new(config);
        // 'é' is two bytes; truncation must not split it
        let truncated = client.truncate_content("abcdéf");
        assert!(truncated.len() <= 5);
        assert!(truncated.is_char_boundary(truncated.len()));
    }
}
