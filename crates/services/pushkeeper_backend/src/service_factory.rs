//! Service factory for the backend.
//!
//! Collects the delivery providers of the enabled integrations behind the
//! [`ServiceFactory`] trait so the rest of the backend never names a vendor.

use pushkeeper_common::services::{PushDeliveryService, ServiceFactory, UnconfiguredDeliveryService};
use pushkeeper_config::AppConfig;
use pushkeeper_firebase::FirebaseServiceFactory;
use std::sync::Arc;
use tracing::warn;

pub struct PushkeeperServiceFactory {
    firebase: FirebaseServiceFactory,
}

impl PushkeeperServiceFactory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            firebase: FirebaseServiceFactory::new(config),
        }
    }

    /// The configured delivery service, or one that fails every attempt
    /// transiently so no token is lost while push is unconfigured.
    pub fn delivery_or_unconfigured(&self) -> Arc<dyn PushDeliveryService> {
        self.delivery_service().unwrap_or_else(|| {
            warn!("No push delivery provider configured; deliveries will fail transiently");
            Arc::new(UnconfiguredDeliveryService)
        })
    }
}

impl ServiceFactory for PushkeeperServiceFactory {
    fn delivery_service(&self) -> Option<Arc<dyn PushDeliveryService>> {
        self.firebase.delivery_service()
    }
}
