//! Startup helpers for the capture gateway.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::server::{self, AppState};

/// Run the gateway until Ctrl-C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    // A missing .env file is normal in containers.
    let _ = dotenvy::dotenv();

    let config = GatewayConfig::from_env();
    init_tracing(&config.log_level);

    tracing::info!("Starting capture gateway v{}", env!("CARGO_PKG_VERSION"));

    let state = match initialize(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to initialize gateway: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(
        state,
        config.port,
        shutdown_signal(),
    )) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Capture gateway stopped");
    ExitCode::SUCCESS
}

/// Validate configuration, prepare the temp directory and build state.
///
/// # Errors
/// Returns an error if configuration is invalid, the temp directory cannot be
/// created or an HTTP client cannot be built.
pub fn initialize(config: &GatewayConfig) -> GatewayResult<Arc<AppState>> {
    config.validate()?;
    std::fs::create_dir_all(&config.tmp_dir)?;

    if config.shared_secret.is_none() {
        tracing::warn!("CS_SHARED_SECRET not set; /process and /embed accept any caller");
    }
    tracing::info!(
        tmp_dir = %config.tmp_dir.display(),
        max_upload_mb = config.max_upload_mb,
        model = %config.gemini_model,
        "Configuration loaded"
    );

    AppState::from_config(config)
}

/// `RUST_LOG` wins; otherwise `LOG_LEVEL` sets the default level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
