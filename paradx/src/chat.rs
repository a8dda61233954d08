//! Topic gate for the chatbot.
//!
//! Only messages mentioning one of the allowed keywords are forwarded to the model. Matching is
//! a case-insensitive substring test, so "Paralyzed" does not match "paralysis" but
//! "post-stroke" matches "stroke".

use crate::config::ChatConfig;

/// Reply for messages that fail the gate. No inference call is made for these.
pub const REFUSAL: &str = "I only answer medical questions about paralysis or speech issues.";

/// Reply when the model returned nothing.
pub const NO_RESPONSE: &str = "⚠️ AI did not respond.";

/// Reply for empty or whitespace-only messages.
pub const EMPTY_MESSAGE: &str = "Please enter a question.";

#[derive(Debug, Clone)]
pub struct TopicGate {
    keywords: Vec<String>,
}

impl TopicGate {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(&config.allowed_keywords)
    }

    /// Whether `message` mentions at least one allowed keyword.
    pub fn allows(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.keywords.iter().any(|keyword| message.contains(keyword.as_str()))
    }
}

impl Default for TopicGate {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}
