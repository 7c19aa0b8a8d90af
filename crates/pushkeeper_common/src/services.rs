// --- File: crates/pushkeeper_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! The delivery provider is a trait object so the registry service can be
//! wired to Firebase in production and to a scripted fake in tests.

use crate::models::{DeliveryFailure, PushNotification};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Sends one notification to one token.
///
/// On success returns the platform's message id. Failures are already
/// classified; implementations must not report a transient problem
/// (network, quota, auth) as [`DeliveryFailure::Permanent`].
pub trait PushDeliveryService: Send + Sync {
    fn deliver<'a>(
        &'a self,
        token: &'a str,
        notification: &'a PushNotification,
    ) -> BoxFuture<'a, String, DeliveryFailure>;
}

/// A factory for creating service instances.
pub trait ServiceFactory: Send + Sync {
    /// Get a push delivery service instance, if one is configured.
    fn delivery_service(&self) -> Option<Arc<dyn PushDeliveryService>>;
}

/// Delivery service used when no provider is configured.
///
/// Every attempt fails transiently, so no token is ever dropped because the
/// provider is missing.
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredDeliveryService;

impl PushDeliveryService for UnconfiguredDeliveryService {
    fn deliver<'a>(
        &'a self,
        _token: &'a str,
        _notification: &'a PushNotification,
    ) -> BoxFuture<'a, String, DeliveryFailure> {
        Box::pin(async {
            Err(DeliveryFailure::Transient(
                "no delivery provider configured".to_string(),
            ))
        })
    }
}
