// File: crates/pushkeeper_registry/src/handlers.rs
use crate::logic::{reconcile, Reconciliation};
use crate::service::{BroadcastSummary, DeliverySummary, RegistryService};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use pushkeeper_common::models::{
    DeliveryReport, DeviceTokenEntry, DeviceTokenRegistry, PushNotification,
};
use pushkeeper_common::{map_json_error, PushkeeperError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

// Shared state for the registry handlers
#[derive(Clone)]
pub struct RegistryState {
    pub service: Arc<RegistryService>,
}

#[derive(Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterDeviceRequest {
    pub user_id: String,
    /// Stable device label chosen by the client, e.g. "iPhone"
    pub device: String,
    /// Token issued by the messaging platform
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnregisterDeviceRequest {
    pub user_id: String,
    pub device: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SendNotificationRequest {
    pub user_id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BroadcastRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Option<HashMap<String, String>>,
}

/// Stateless reconcile input; nothing is read or stored.
#[derive(Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReconcileRequest {
    pub tokens: Vec<DeviceTokenEntry>,
    #[serde(default)]
    pub outcomes: Vec<DeliveryReport>,
    pub push_enabled: bool,
}

/// Register or refresh the token of one device.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/registry/register-device",
    request_body = RegisterDeviceRequest,
    responses(
        (status = 200, description = "Registry after the change", body = DeviceTokenRegistry),
        (status = 400, description = "Empty user_id, device or token"),
        (status = 409, description = "Concurrent writers kept winning")
    ),
    tag = "Registry"
))]
pub async fn register_device_handler(
    State(state): State<RegistryState>,
    Json(payload): Json<RegisterDeviceRequest>,
) -> Result<Json<DeviceTokenRegistry>, Response> {
    info!(
        "Register device {} for user {}",
        payload.device, payload.user_id
    );
    let result = state
        .service
        .register_device(&payload.user_id, &payload.device, &payload.token)
        .await;
    map_json_error(result, PushkeeperError::from)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/registry/unregister-device",
    request_body = UnregisterDeviceRequest,
    responses(
        (status = 200, description = "Registry after the change", body = DeviceTokenRegistry),
        (status = 404, description = "No registry for the user")
    ),
    tag = "Registry"
))]
pub async fn unregister_device_handler(
    State(state): State<RegistryState>,
    Json(payload): Json<UnregisterDeviceRequest>,
) -> Result<Json<DeviceTokenRegistry>, Response> {
    let result = state
        .service
        .unregister_device(&payload.user_id, &payload.device)
        .await;
    map_json_error(result, PushkeeperError::from)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/registry/users/{user_id}",
    params(("user_id" = String, Path, description = "Owner of the registry")),
    responses(
        (status = 200, description = "Stored registry", body = DeviceTokenRegistry),
        (status = 404, description = "No registry for the user")
    ),
    tag = "Registry"
))]
pub async fn get_registry_handler(
    State(state): State<RegistryState>,
    Path(user_id): Path<String>,
) -> Result<Json<DeviceTokenRegistry>, Response> {
    let result = state.service.get_registry(&user_id).await;
    map_json_error(result, PushkeeperError::from)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/registry/users/{user_id}",
    params(("user_id" = String, Path, description = "Owner of the registry")),
    responses(
        (status = 204, description = "Registry deleted"),
        (status = 404, description = "No registry for the user")
    ),
    tag = "Registry"
))]
pub async fn delete_registry_handler(
    State(state): State<RegistryState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.service.delete_user(&user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => PushkeeperError::from(e).into_response(),
    }
}

/// Notify every device of one user and prune rejected tokens.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/registry/send-notification-to-user",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Per-device outcomes", body = DeliverySummary),
        (status = 400, description = "Empty user_id")
    ),
    tag = "Registry"
))]
pub async fn send_notification_to_user_handler(
    State(state): State<RegistryState>,
    Json(payload): Json<SendNotificationRequest>,
) -> Result<Json<DeliverySummary>, Response> {
    let notification = PushNotification {
        title: payload.title,
        body: payload.body,
        data: payload.data,
    };
    let result = state
        .service
        .notify_user(&payload.user_id, &notification)
        .await;
    map_json_error(result, PushkeeperError::from)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/registry/broadcast",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Per-user outcomes", body = BroadcastSummary)
    ),
    tag = "Registry"
))]
pub async fn broadcast_handler(
    State(state): State<RegistryState>,
    Json(payload): Json<BroadcastRequest>,
) -> Result<Json<BroadcastSummary>, Response> {
    let notification = PushNotification {
        title: payload.title,
        body: payload.body,
        data: payload.data,
    };
    let result = state.service.broadcast(&notification).await;
    map_json_error(result, PushkeeperError::from)
}

/// Run the reconcile fold on a caller-supplied token list.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/registry/reconcile",
    request_body = ReconcileRequest,
    responses(
        (status = 200, description = "Surviving tokens and flag", body = Reconciliation)
    ),
    tag = "Registry"
))]
pub async fn reconcile_handler(Json(payload): Json<ReconcileRequest>) -> Json<Reconciliation> {
    Json(reconcile(
        &payload.tokens,
        &payload.outcomes,
        payload.push_enabled,
    ))
}
