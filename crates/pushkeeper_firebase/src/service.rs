//! Firebase service factory implementation.

use crate::client::FirebaseClient;
use pushkeeper_common::services::{PushDeliveryService, ServiceFactory};
use pushkeeper_common::is_firebase_enabled;
use pushkeeper_config::AppConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the FCM delivery service from configuration.
pub struct FirebaseServiceFactory {
    client: Option<Arc<FirebaseClient>>,
}

impl FirebaseServiceFactory {
    /// Create the factory. A disabled or incomplete `firebase` section
    /// yields a factory without a delivery service.
    pub fn new(config: &AppConfig) -> Self {
        if !is_firebase_enabled(config) {
            info!("Firebase delivery disabled");
            return Self { client: None };
        }

        let client = config
            .firebase
            .as_ref()
            .and_then(|firebase| match FirebaseClient::new(firebase) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!("Firebase delivery not available: {}", e);
                    None
                }
            });

        Self { client }
    }
}

impl ServiceFactory for FirebaseServiceFactory {
    fn delivery_service(&self) -> Option<Arc<dyn PushDeliveryService>> {
        self.client
            .clone()
            .map(|client| client as Arc<dyn PushDeliveryService>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushkeeper_config::FirebaseConfig;

    #[test]
    fn test_disabled_firebase_has_no_service() {
        let config = AppConfig {
            use_firebase: false,
            ..Default::default()
        };
        assert!(FirebaseServiceFactory::new(&config).delivery_service().is_none());
    }

    #[test]
    fn test_incomplete_firebase_has_no_service() {
        let config = AppConfig {
            use_firebase: true,
            firebase: Some(FirebaseConfig::default()),
            ..Default::default()
        };
        assert!(FirebaseServiceFactory::new(&config).delivery_service().is_none());
    }

    #[test]
    fn test_configured_firebase_has_service() {
        let config = AppConfig {
            use_firebase: true,
            firebase: Some(FirebaseConfig {
                project_id: Some("demo".to_string()),
                access_token: Some("token".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(FirebaseServiceFactory::new(&config).delivery_service().is_some());
    }
}
