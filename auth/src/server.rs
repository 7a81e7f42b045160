use async_trait::async_trait;
use common_database::{DatabaseConfig, DatabaseError};
use lifecycle::{Controller, ControllerBuilder, LifecycleError, ResourceProvider, ShutdownReport};
use metrics_exporter_prometheus::BuildError;
use sqlx::PgPool;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::metrics::setup_metrics_recorder;
use crate::router::{router, AppState};

pub const SERVICE_NAME: &str = "auth service";

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Hands the Postgres pool to the lifecycle controller.
pub struct PoolProvider {
    config: DatabaseConfig,
}

impl PoolProvider {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ResourceProvider for PoolProvider {
    type Resource = PgPool;
    type Error = DatabaseError;

    fn name(&self) -> &'static str {
        "postgres pool"
    }

    async fn open(&self, shutdown: &CancellationToken) -> Result<PgPool, DatabaseError> {
        common_database::open(&self.config, shutdown).await
    }

    async fn close(&self, pool: PgPool) {
        common_database::close(&pool, self.config.close_timeout()).await
    }
}

pub fn controller_builder(config: &Config) -> ControllerBuilder {
    Controller::builder(SERVICE_NAME)
        .with_drain_timeout(config.shutdown_timeout())
        .with_force_on_second_signal(config.force_on_second_signal)
}

/// Controller for the service, trapping SIGINT/SIGTERM.
pub fn controller(config: &Config) -> Controller {
    controller_builder(config).build()
}

/// Open the pool, serve until shutdown, then drain and release the pool.
pub async fn serve(config: Config, controller: Controller) -> Result<ShutdownReport, ServeError> {
    let recorder = if config.enable_metrics {
        Some(setup_metrics_recorder()?)
    } else {
        None
    };

    let bind = config.bind();
    info!(address = %bind, "starting {}", SERVICE_NAME);

    let provider = PoolProvider::new(config.database);
    let report = controller
        .run(provider, &bind, move |pool| router(AppState { pool }, recorder))
        .await?;

    Ok(report)
}
