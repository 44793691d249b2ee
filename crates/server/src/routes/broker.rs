use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use models::{
    BindingRequest, BindingResponse, Catalog, CreateServiceInstanceRequest, CreateServiceInstanceResponse,
    DeleteServiceInstanceResponse, ServiceInstance,
};
use serde_json::{json, Value};
use service::BrokerError;
use tracing::{debug, warn};

use super::AppState;
use crate::errors::ApiError;

pub async fn catalog(State(state): State<AppState>) -> Result<Json<Catalog>, ApiError> {
    Ok(Json(state.controller.catalog().await?))
}

pub async fn provision(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    Json(req): Json<CreateServiceInstanceRequest>,
) -> Result<(StatusCode, Json<CreateServiceInstanceResponse>), ApiError> {
    let resp = state.controller.create_service_instance(&instance_id, &req).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

pub async fn get_instance(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
) -> Result<Json<ServiceInstance>, ApiError> {
    Ok(Json(state.controller.get_service_instance(&instance_id).await?))
}

pub async fn deprovision(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
) -> Result<Json<DeleteServiceInstanceResponse>, ApiError> {
    Ok(Json(state.controller.remove_service_instance(&instance_id).await?))
}

/// The bind body is optional; nothing in it affects the credentials. A body
/// sent as JSON must still parse.
pub async fn bind(
    State(state): State<AppState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
    body: Result<Json<BindingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BindingResponse>), ApiError> {
    match body {
        Ok(Json(req)) => debug!(%instance_id, %binding_id, app_guid = ?req.app_guid, "bind request"),
        Err(JsonRejection::MissingJsonContentType(_)) => {}
        Err(rejection) => {
            warn!(%instance_id, %binding_id, error = %rejection.body_text(), "malformed bind body");
            return Err(BrokerError::invalid("body", rejection.body_text()).into());
        }
    }
    let resp = state.controller.bind(&instance_id, &binding_id).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

pub async fn unbind(
    State(state): State<AppState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state.controller.unbind(&instance_id, &binding_id).await?;
    Ok(Json(json!({})))
}
