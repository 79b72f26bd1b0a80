//! Document analysis: summary, entities, detected events, and decade.
//!
//! Two interchangeable strategies sit behind [`DocumentAnalyzer`]: the
//! remote chat-model chain ([`RemoteAnalyzer`]) and the local model
//! ensemble ([`EnsembleAnalyzer`]). [`build_analyzer`] picks one at
//! startup based on whether a remote credential is configured. Both run
//! the same regex safety net for musicology terms and the same
//! decade detector over the full document text.

pub mod ensemble;
pub mod lexicon;
pub mod parser;
pub mod prompt;
pub mod remote;
pub mod types;

pub use ensemble::*;
pub use lexicon::*;
pub use parser::*;
pub use prompt::*;
pub use remote::*;
pub use types::*;

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::ollama::{LlmClient, OllamaClient};
use super::openrouter::{ModelChain, OpenRouterClient};
use super::ModelCallError;
use crate::config::{Settings, OPENROUTER_BASE_URL};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Model call failed: {0}")]
    Model(#[from] ModelCallError),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// Select the analysis strategy once at startup. A remote credential means
/// the remote chain; otherwise the local ensemble.
pub fn build_analyzer(
    settings: &Settings,
) -> Result<Box<dyn DocumentAnalyzer + Send + Sync>, AnalysisError> {
    match settings.openrouter_api_key.as_deref() {
        Some(key) => {
            info!(
                main = %settings.main_model,
                fallback = %settings.fallback_model,
                "Remote credential found, using the remote analysis chain"
            );
            let client =
                OpenRouterClient::new(OPENROUTER_BASE_URL, key, settings.request_timeout_secs)?;
            let chain = ModelChain::new(
                Box::new(client),
                vec![settings.main_model.clone(), settings.fallback_model.clone()],
            );
            Ok(Box::new(RemoteAnalyzer::new(chain)))
        }
        None => {
            info!(
                url = %settings.ollama_url,
                "No remote credential, using the local analysis ensemble"
            );
            let client: Arc<dyn LlmClient + Send + Sync> = Arc::new(OllamaClient::new(
                &settings.ollama_url,
                settings.request_timeout_secs,
            )?);

            for model in [
                &settings.ner_model,
                &settings.classifier_model,
                &settings.summarizer_model,
            ] {
                match client.is_model_available(model) {
                    Ok(true) => {}
                    Ok(false) => {
                        warn!(model = %model, "Local model is not pulled; its calls will fail")
                    }
                    Err(e) => {
                        warn!(error = %e, "Could not check local model availability");
                        break;
                    }
                }
            }

            Ok(Box::new(EnsembleAnalyzer::new(
                Box::new(OllamaEntityTagger::new(
                    Arc::clone(&client),
                    &settings.ner_model,
                )),
                Box::new(OllamaEventClassifier::new(
                    Arc::clone(&client),
                    &settings.classifier_model,
                )),
                Box::new(OllamaSummarizer::new(client, &settings.summarizer_model)),
            )))
        }
    }
}
