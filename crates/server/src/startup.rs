use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use backend::{HttpBackendClient, VolumeBackend};
use configs::AppConfig;
use service::{LifecycleController, SharedController};
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};

/// Build the controller against the configured OpenSDS endpoint.
pub fn build_controller(cfg: &AppConfig) -> Result<SharedController, StartupError> {
    let client = HttpBackendClient::new(&cfg.backend)?;
    let backend: Arc<dyn VolumeBackend> = Arc::new(client);
    Ok(Arc::new(LifecycleController::new(backend)))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {}:{}: {e}", cfg.server.host, cfg.server.port)))
}

pub fn build_app(controller: SharedController) -> Router {
    routes::build_router(AppState { controller })
}

/// Serve the broker until `shutdown` resolves.
pub async fn run(cfg: AppConfig, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
    let controller = build_controller(&cfg)?;
    let app = build_app(controller);

    let addr = bind_addr(&cfg)?;
    info!(%addr, endpoint = %cfg.backend.endpoint, api_version = %cfg.backend.api_version, "starting broker");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("broker stopped");
    Ok(())
}
