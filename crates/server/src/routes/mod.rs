pub mod broker;

use axum::{
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use common::types::Health;
use service::SharedController;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Clone)]
pub struct AppState {
    pub controller: SharedController,
}

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

pub async fn metrics() -> (StatusCode, String) {
    match service::observability::encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}")),
    }
}

/// Build the broker router: OSB `/v2` routes plus health and metrics.
pub fn build_router(state: AppState) -> Router {
    let osb = Router::new()
        .route("/v2/catalog", get(broker::catalog))
        .route(
            "/v2/service_instances/:instance_id",
            put(broker::provision).get(broker::get_instance).delete(broker::deprovision),
        )
        .route(
            "/v2/service_instances/:instance_id/service_bindings/:binding_id",
            put(broker::bind).delete(broker::unbind),
        );

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(osb)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
