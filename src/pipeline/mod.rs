//! Document processing pipeline: PDF text extraction, NLP analysis, and
//! event assembly.

use thiserror::Error;

pub mod analysis;
pub mod dates;
pub mod extraction;
pub mod ollama;
pub mod openrouter;
pub mod processor;

/// Errors from calling language model backends, remote or local.
#[derive(Error, Debug)]
pub enum ModelCallError {
    #[error("API key is not configured")]
    MissingCredential,

    #[error("Cannot connect to {0}. Is the service running?")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Model API returned error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse model response: {0}")]
    ResponseParsing(String),

    #[error("No models configured for completion chain")]
    NoModelsConfigured,

    #[error("All models in chain failed; last error: {0}")]
    AllModelsFailed(String),
}
