//! Entity span model for the extraction playground.

use serde::{Deserialize, Serialize};

/// A substring of input text tagged with a semantic category by the
/// NLP model. Ephemeral; lives only for the duration of one render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// The matched substring, exactly as it appears in the input.
    pub text: String,
    /// Classification label (e.g. PERSON, ORG, LOC, PRODUCT).
    pub label: String,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}
