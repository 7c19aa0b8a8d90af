// --- File: crates/pushkeeper_registry/src/routes.rs ---

use crate::handlers::{
    broadcast_handler, delete_registry_handler, get_registry_handler, reconcile_handler,
    register_device_handler, send_notification_to_user_handler, unregister_device_handler,
    RegistryState,
};
use crate::service::RegistryService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all device registry routes.
pub fn routes(service: Arc<RegistryService>) -> Router {
    let state = RegistryState { service };

    Router::new()
        .route("/registry/register-device", post(register_device_handler))
        .route("/registry/unregister-device", post(unregister_device_handler))
        .route(
            "/registry/users/{user_id}",
            get(get_registry_handler).delete(delete_registry_handler),
        )
        .route(
            "/registry/send-notification-to-user",
            post(send_notification_to_user_handler),
        )
        .route("/registry/broadcast", post(broadcast_handler))
        .route("/registry/reconcile", post(reconcile_handler))
        .with_state(state)
}
