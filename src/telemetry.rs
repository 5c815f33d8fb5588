//! Tracing subscriber setup and shutdown signalling.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Quiet defaults for noisy dependencies, appended to the configured level.
const DEPENDENCY_DIRECTIVES: &str = "hyper=warn,reqwest=warn,tower_http=info";

/// Builds the filter: `RUST_LOG` wins, otherwise the configured level.
pub fn env_filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},{DEPENDENCY_DIRECTIVES}", cfg.level).into())
}

/// Installs the global subscriber, writing to stderr.
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init_tracing(cfg: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(env_filter(cfg));
    let result = if cfg.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
#[cfg(feature = "api")]
pub async fn shutdown_signal() {
    use tokio::signal;
    use tracing::{info, warn};

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
    info!("shutdown signal received");
}
