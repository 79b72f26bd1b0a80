use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Gharana";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// OpenRouter-compatible chat completions API root.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default local inference runtime (Ollama-compatible API).
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default remote model chain.
pub const DEFAULT_MAIN_MODEL: &str = "moonshotai/kimi-k2.5";
pub const DEFAULT_FALLBACK_MODEL: &str = "openai/gpt-oss-120b";

/// Default local ensemble models (named-entity tagging, zero-shot event
/// classification, summarization).
pub const DEFAULT_NER_MODEL: &str = "qwen2.5:3b-instruct";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "qwen2.5:3b-instruct";
pub const DEFAULT_SUMMARIZER_MODEL: &str = "llama3.2:3b";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "info,gharana=debug".to_string()
}

/// Get the application data directory
/// ~/Gharana/ on all platforms (user-visible, survives reinstalls)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Gharana")
}

/// Directory where uploaded archive PDFs are staged.
pub fn uploads_dir() -> PathBuf {
    app_data_dir().join("uploads")
}

/// Directory for processed per-document artifacts.
pub fn processed_dir() -> PathBuf {
    app_data_dir().join("processed")
}

/// Directory where timeline artifact JSON files are written by the host.
pub fn timelines_dir() -> PathBuf {
    app_data_dir().join("timelines")
}

/// Runtime settings assembled once at startup.
///
/// The remote credential decides the analysis strategy: when
/// `openrouter_api_key` is `None` the pipeline runs on the local model
/// ensemble instead of the remote chain.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openrouter_api_key: Option<String>,
    pub main_model: String,
    pub fallback_model: String,
    pub ollama_url: String,
    pub ner_model: String,
    pub classifier_model: String,
    pub summarizer_model: String,
    /// Per-request timeout for model calls, in seconds.
    pub request_timeout_secs: u64,
    pub uploads_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub timelines_dir: PathBuf,
}

impl Settings {
    /// Read settings from the environment, falling back to defaults.
    ///
    /// An empty `OPENROUTER_API_KEY` counts as absent.
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        Self {
            openrouter_api_key: api_key,
            main_model: env_or("OPENROUTER_MAIN_MODEL", DEFAULT_MAIN_MODEL),
            fallback_model: env_or("OPENROUTER_FALLBACK_MODEL", DEFAULT_FALLBACK_MODEL),
            ollama_url: env_or("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            ner_model: env_or("NER_MODEL", DEFAULT_NER_MODEL),
            classifier_model: env_or("CLASSIFIER_MODEL", DEFAULT_CLASSIFIER_MODEL),
            summarizer_model: env_or("SUMMARIZER_MODEL", DEFAULT_SUMMARIZER_MODEL),
            request_timeout_secs: 120,
            uploads_dir: path_env_or("UPLOAD_DIR", uploads_dir),
            processed_dir: path_env_or("PROCESSED_DIR", processed_dir),
            timelines_dir: path_env_or("TIMELINE_DIR", timelines_dir),
        }
    }

    /// True when the remote chain is usable.
    pub fn has_remote_credential(&self) -> bool {
        self.openrouter_api_key.is_some()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            main_model: DEFAULT_MAIN_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ner_model: DEFAULT_NER_MODEL.to_string(),
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            summarizer_model: DEFAULT_SUMMARIZER_MODEL.to_string(),
            request_timeout_secs: 120,
            uploads_dir: uploads_dir(),
            processed_dir: processed_dir(),
            timelines_dir: timelines_dir(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn path_env_or(key: &str, default: fn() -> PathBuf) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default)
}
