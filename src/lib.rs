pub mod config;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod synthesis;
pub mod timeline;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for embedding hosts.
///
/// Respects `RUST_LOG` when set, otherwise uses the crate default filter.
/// Call once at process start; the surrounding application owns the
/// subscriber for its own lifetime.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Gharana core v{}", config::APP_VERSION);
}
