use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{MockError, Result};

/// Sets up the logging subscriber for the application.
///
/// `RUST_LOG` wins when set, otherwise the service logs at INFO.
pub fn init_logger(service_name: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_level(true)
        .with_ansi(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| MockError::Internal(format!("Failed to initialize logger: {}", e)))?;

    tracing::info!(service = service_name, version = env!("CARGO_PKG_VERSION"), "Logger initialized");
    Ok(())
}
