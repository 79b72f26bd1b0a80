//! Cross-decade research synthesis.
//!
//! Turns a concept's per-decade summary collections into a structured
//! comparative report via the remote model chain. Model output that is not
//! valid JSON never disappears: the raw text is kept on the outcome.

pub mod engine;
pub mod prompt;
pub mod types;

pub use engine::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

use crate::pipeline::ModelCallError;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Model call failed: {0}")]
    Model(#[from] ModelCallError),
}
