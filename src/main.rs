use std::sync::Arc;

use metering_prometheus_mock::{
    api::{self, health::SERVICE_NAME, AppState},
    config::{Config, DirectoryBackend},
    directory::{DirectoryLookup, InMemoryDirectory, PostgresDirectory},
    logging, metrics,
    synth::Synthesizer,
    Result,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logger(SERVICE_NAME)?;
    let config = Config::from_env()?;
    info!(?config, "Loaded configuration");

    metrics::init_metrics();

    let directory: Arc<dyn DirectoryLookup> = match config.directory_backend {
        DirectoryBackend::Postgres => Arc::new(PostgresDirectory::new(
            config.database.clone(),
            config.lookup_timeout,
        )),
        DirectoryBackend::Memory => Arc::new(InMemoryDirectory::sample(10)),
    };

    let state = AppState::new(
        directory,
        Synthesizer::from_seed(config.seed),
        config.systems_per_org,
    );

    api::serve(&config, state).await
}
