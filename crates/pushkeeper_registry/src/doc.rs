// File: crates/pushkeeper_registry/src/doc.rs

use crate::handlers::{
    BroadcastRequest, ReconcileRequest, RegisterDeviceRequest, SendNotificationRequest,
    UnregisterDeviceRequest,
};
use crate::logic::Reconciliation;
use crate::service::{BroadcastSummary, DeliverySummary};
use pushkeeper_common::models::{
    DeliveryOutcome, DeliveryReport, DeviceTokenEntry, DeviceTokenRegistry,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::register_device_handler,
        crate::handlers::unregister_device_handler,
        crate::handlers::get_registry_handler,
        crate::handlers::delete_registry_handler,
        crate::handlers::send_notification_to_user_handler,
        crate::handlers::broadcast_handler,
        crate::handlers::reconcile_handler,
    ),
    components(
        schemas(
            RegisterDeviceRequest,
            UnregisterDeviceRequest,
            SendNotificationRequest,
            BroadcastRequest,
            ReconcileRequest,
            Reconciliation,
            DeliverySummary,
            BroadcastSummary,
            DeliveryReport,
            DeliveryOutcome,
            DeviceTokenEntry,
            DeviceTokenRegistry,
        )
    ),
    tags(
        (name = "Registry", description = "Per-user device token registry and delivery")
    )
)]
pub struct RegistryApiDoc;
