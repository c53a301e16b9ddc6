//! Inventory assistant backends.
//!
//! The `/ai/query/` handler answers queries through an [`Assistant`]:
//!
//! - [`SimulatedAssistant`]: canned keyword answers, used when no API key is configured
//! - [`GeminiAssistant`]: Google Gemini `generateContent` over HTTP

mod gemini;
mod simulated;

use std::sync::Arc;

use thiserror::Error;

pub use gemini::GeminiAssistant;
pub use simulated::SimulatedAssistant;

use crate::config::{AssistantConfig, AssistantProvider};

/// Instructions prepended to every query sent to a model.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant for an inventory management system. \
You can answer questions about inventory, products, sales, and related topics. \
Keep your answers concise and focused on inventory management.";

/// Failure to produce an answer.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// The model API could not be reached.
    #[error("Failed to reach the model API: {0}")]
    Http(#[from] reqwest::Error),

    /// The model API answered with an error status.
    #[error("Model API returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The reply carried no answer text.
    #[error("Failed to get a valid response from the model API")]
    EmptyResponse,

    /// Settings are incomplete.
    #[error("Assistant misconfigured: {0}")]
    Config(String),
}

/// Answers a single inventory query.
#[async_trait::async_trait]
pub trait Assistant: Send + Sync + std::fmt::Debug {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn answer(&self, query: &str) -> Result<String, AssistantError>;
}

/// Combine the system instructions with a user query.
#[must_use]
pub fn build_prompt(query: &str) -> String {
    format!("{SYSTEM_PROMPT}\n\nUser query: {query}")
}

/// Build the backend selected by `config`.
pub fn from_config(config: &AssistantConfig) -> Result<Arc<dyn Assistant>, AssistantError> {
    match config.provider {
        AssistantProvider::Simulated => Ok(Arc::new(SimulatedAssistant)),
        AssistantProvider::Gemini => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| AssistantError::Config("Gemini requires an API key".to_string()))?;
            Ok(Arc::new(GeminiAssistant::new(
                reqwest::Client::new(),
                &config.base_url,
                api_key,
                &config.model,
            )))
        }
    }
}
