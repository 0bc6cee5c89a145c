// Copy generation abstractions
//
// Marketing copy (taglines, event descriptions) comes from an external
// generative-text provider behind the CopyWriter trait. Prompt templates
// live here so providers only deal in system + user strings.

use async_trait::async_trait;

use crate::error::Result;

/// Configuration for a copy-generation call
#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Provider model identifier
    pub model: String,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            model: "claude-haiku-4-5".to_string(),
            max_tokens: 512,
            temperature: Some(0.8),
        }
    }
}

/// Trait for copy-generation providers
///
/// Implementations handle provider-specific API calls and return the
/// generated text verbatim.
#[async_trait]
pub trait CopyWriter: Send + Sync {
    /// Run one prompt through the provider and return the completion text
    async fn complete(&self, system: &str, prompt: &str, config: &CopyConfig) -> Result<String>;
}

/// System prompt for tagline generation
pub const TAGLINE_SYSTEM: &str = "You are a marketing expert specializing in \
creating catchy taglines for events. Based on the event title and description \
provided, generate a short, engaging, and memorable tagline for the event. \
Respond with the tagline only, no quotes or commentary.";

/// System prompt for description generation
pub const DESCRIPTION_SYSTEM: &str = "You are a marketing expert writing \
compelling event descriptions. Based on the event title provided, write a \
short, inviting description (2-4 sentences) that makes people want to attend. \
Respond with the description only, no quotes or commentary.";

/// Build the user prompt for tagline generation
pub fn tagline_prompt(event_title: &str, event_description: &str) -> String {
    format!(
        "Event Title: {event_title}\nEvent Description: {event_description}\n\nTagline:"
    )
}

/// Build the user prompt for description generation
pub fn description_prompt(event_title: &str) -> String {
    format!("Event Title: {event_title}\n\nDescription:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagline_prompt_includes_inputs() {
        let prompt = tagline_prompt("Quantum Futures Expo", "Two days of demos.");
        assert!(prompt.contains("Quantum Futures Expo"));
        assert!(prompt.contains("Two days of demos."));
        assert!(prompt.ends_with("Tagline:"));
    }

    #[test]
    fn test_description_prompt_includes_title() {
        let prompt = description_prompt("Rust Meetup");
        assert!(prompt.contains("Rust Meetup"));
        assert!(prompt.ends_with("Description:"));
    }

    #[test]
    fn test_default_config() {
        let config = CopyConfig::default();
        assert!(config.max_tokens > 0);
        assert!(!config.model.is_empty());
    }
}
