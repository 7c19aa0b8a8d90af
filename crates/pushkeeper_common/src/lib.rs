// --- File: crates/pushkeeper_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod features; // Runtime feature flags
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared data structures
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    conflict, not_found, validation_error, Context, HttpStatusCode, PushkeeperError,
};

// Re-export HTTP utilities for easier access
pub use http::{client::create_client, map_json_error, IntoHttpResponse};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_config, init_with_level, log_error, log_result};

pub use features::{is_database_enabled, is_feature_enabled, is_firebase_enabled};

pub use models::{
    DeliveryFailure, DeliveryOutcome, DeliveryReport, DeviceTokenEntry, DeviceTokenRegistry,
    PushNotification,
};
pub use services::{BoxFuture, PushDeliveryService, ServiceFactory, UnconfiguredDeliveryService};
