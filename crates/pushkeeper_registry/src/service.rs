// --- File: crates/pushkeeper_registry/src/service.rs ---
//! Registry service.
//!
//! Ties the pure token list operations to a store and a delivery provider.
//! Every change is a read-modify-write guarded by the registry version; a
//! lost race re-reads and re-applies the change on the fresh copy.

use crate::logic::{reconcile, remove_device, upsert};
use crate::repository::RegistryStore;
use pushkeeper_common::models::{
    DeliveryOutcome, DeliveryReport, DeviceTokenEntry, DeviceTokenRegistry, PushNotification,
};
use pushkeeper_common::services::PushDeliveryService;
use pushkeeper_common::{conflict, not_found, validation_error, PushkeeperError};
use pushkeeper_config::RegistryConfig;
use pushkeeper_db::{DbError, DeviceTokenRegistryRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Errors that can occur in the registry service.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("No registry for user {0}")]
    NotFound(String),
    #[error("Registry for user {user_id} kept changing, gave up after {attempts} attempts")]
    WriteConflict { user_id: String, attempts: u32 },
    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

impl From<RegistryError> for PushkeeperError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::Validation(msg) => validation_error(msg),
            RegistryError::NotFound(_) => not_found(&error),
            RegistryError::WriteConflict { .. } => conflict(&error),
            RegistryError::Store(e) => PushkeeperError::DatabaseError(e.to_string()),
        }
    }
}

/// What happened when notifying one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeliverySummary {
    pub user_id: String,
    /// No registry, push disabled or no tokens; nothing was sent
    pub skipped: bool,
    pub accepted: usize,
    pub permanently_invalid: usize,
    pub transient: usize,
    /// One report per delivery attempt
    pub reports: Vec<DeliveryReport>,
    /// Entries dropped from the registry after this cycle
    pub removed: Vec<DeviceTokenEntry>,
    /// Flag as stored after this cycle
    pub push_enabled: bool,
}

impl DeliverySummary {
    fn skipped(user_id: &str, push_enabled: bool) -> Self {
        Self {
            user_id: user_id.to_string(),
            skipped: true,
            push_enabled,
            ..Default::default()
        }
    }

    fn count(reports: &[DeliveryReport], outcome: DeliveryOutcome) -> usize {
        reports.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Result of notifying every push-enabled user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BroadcastSummary {
    pub users: Vec<DeliverySummary>,
    /// Users whose cycle failed with a store error or write conflict
    pub failed_users: Vec<String>,
}

/// Keeps per-user device token registries and delivers to them.
pub struct RegistryService<R = RegistryStore> {
    store: R,
    delivery: Arc<dyn PushDeliveryService>,
    max_write_attempts: u32,
}

fn require(field: &str, value: &str) -> Result<(), RegistryError> {
    if value.trim().is_empty() {
        return Err(RegistryError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl<R> RegistryService<R>
where
    R: DeviceTokenRegistryRepository + Send + Sync,
{
    pub fn new(store: R, delivery: Arc<dyn PushDeliveryService>, config: &RegistryConfig) -> Self {
        Self {
            store,
            delivery,
            max_write_attempts: config.max_write_attempts.max(1),
        }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Read-modify-write one registry.
    ///
    /// `change` is applied to a fresh copy on every attempt and returns
    /// whether anything needs to be written. A missing registry is created
    /// when `create_missing` is set, otherwise `Ok(None)` is returned.
    async fn modify<F>(
        &self,
        user_id: &str,
        create_missing: bool,
        mut change: F,
    ) -> Result<Option<DeviceTokenRegistry>, RegistryError>
    where
        F: FnMut(&mut DeviceTokenRegistry) -> bool + Send,
    {
        for attempt in 1..=self.max_write_attempts {
            let mut registry = match self.store.find_by_user(user_id).await? {
                Some(registry) => registry,
                None if create_missing => DeviceTokenRegistry::new(user_id),
                None => return Ok(None),
            };

            if !change(&mut registry) {
                return Ok(Some(registry));
            }

            let expected_version = registry.version;
            let written = if expected_version == 0 {
                self.store.insert_registry(&registry).await?
            } else {
                self.store
                    .replace_registry(&registry, expected_version)
                    .await?
            };

            if written {
                registry.version = expected_version + 1;
                return Ok(Some(registry));
            }

            debug!(
                "Registry for user {} changed concurrently (attempt {}/{})",
                user_id, attempt, self.max_write_attempts
            );
        }

        warn!(
            "Giving up on registry for user {} after {} attempts",
            user_id, self.max_write_attempts
        );
        Err(RegistryError::WriteConflict {
            user_id: user_id.to_string(),
            attempts: self.max_write_attempts,
        })
    }

    /// Store `token` as the current token of `device`, enabling push.
    pub async fn register_device(
        &self,
        user_id: &str,
        device: &str,
        token: &str,
    ) -> Result<DeviceTokenRegistry, RegistryError> {
        require("user_id", user_id)?;
        require("device", device)?;
        require("token", token)?;

        let registry = self
            .modify(user_id, true, |registry| {
                let unchanged = registry.push_enabled
                    && registry
                        .entry_for(device)
                        .is_some_and(|entry| entry.token == token);
                if unchanged {
                    return false;
                }
                let tokens = upsert(&registry.tokens, DeviceTokenEntry::new(device, token));
                registry.apply(tokens, true);
                true
            })
            .await?
            .ok_or_else(|| RegistryError::NotFound(user_id.to_string()))?;

        info!("Registered device {} for user {}", device, user_id);
        Ok(registry)
    }

    /// Forget `device`. Push is disabled once no device is left.
    pub async fn unregister_device(
        &self,
        user_id: &str,
        device: &str,
    ) -> Result<DeviceTokenRegistry, RegistryError> {
        require("user_id", user_id)?;
        require("device", device)?;

        let registry = self
            .modify(user_id, false, |registry| {
                if registry.entry_for(device).is_none() {
                    return false;
                }
                let tokens = remove_device(&registry.tokens, device);
                let push_enabled = registry.push_enabled && !tokens.is_empty();
                registry.apply(tokens, push_enabled);
                true
            })
            .await?
            .ok_or_else(|| RegistryError::NotFound(user_id.to_string()))?;

        info!("Unregistered device {} for user {}", device, user_id);
        Ok(registry)
    }

    pub async fn get_registry(&self, user_id: &str) -> Result<DeviceTokenRegistry, RegistryError> {
        self.store
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(user_id.to_string()))
    }

    /// Drop the whole registry of a user.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), RegistryError> {
        if self.store.delete_registry(user_id).await? {
            info!("Deleted registry for user {}", user_id);
            Ok(())
        } else {
            Err(RegistryError::NotFound(user_id.to_string()))
        }
    }

    /// Deliver `notification` to every device of `user_id` and drop the
    /// tokens the platform rejected for good.
    ///
    /// Transient failures leave the registry untouched; those tokens are
    /// tried again on the next notification.
    pub async fn notify_user(
        &self,
        user_id: &str,
        notification: &PushNotification,
    ) -> Result<DeliverySummary, RegistryError> {
        require("user_id", user_id)?;

        let snapshot = match self.store.find_by_user(user_id).await? {
            Some(registry) if registry.push_enabled && !registry.tokens.is_empty() => registry,
            Some(registry) => {
                debug!("Push disabled for user {}, skipping", user_id);
                return Ok(DeliverySummary::skipped(user_id, registry.push_enabled));
            }
            None => {
                debug!("No registry for user {}, skipping", user_id);
                return Ok(DeliverySummary::skipped(user_id, false));
            }
        };

        let reports = self.deliver_all(&snapshot.tokens, notification).await;

        let mut removed = Vec::new();
        let stored = self
            .modify(user_id, false, |registry| {
                let result = reconcile(&registry.tokens, &reports, registry.push_enabled);
                if !result.changed() {
                    removed.clear();
                    return false;
                }
                removed = result.removed;
                registry.apply(result.tokens, result.push_enabled);
                true
            })
            .await?;

        for entry in &removed {
            info!(
                "Removed invalid token of device {} for user {}",
                entry.device, user_id
            );
        }

        Ok(DeliverySummary {
            user_id: user_id.to_string(),
            skipped: false,
            accepted: DeliverySummary::count(&reports, DeliveryOutcome::Accepted),
            permanently_invalid: DeliverySummary::count(
                &reports,
                DeliveryOutcome::PermanentlyInvalid,
            ),
            transient: DeliverySummary::count(&reports, DeliveryOutcome::TransientError),
            reports,
            removed,
            push_enabled: stored.map(|r| r.push_enabled).unwrap_or(false),
        })
    }

    /// One concurrent delivery per entry.
    async fn deliver_all(
        &self,
        tokens: &[DeviceTokenEntry],
        notification: &PushNotification,
    ) -> Vec<DeliveryReport> {
        let notification = Arc::new(notification.clone());
        let mut tasks = JoinSet::new();

        for entry in tokens.iter().cloned() {
            let delivery = Arc::clone(&self.delivery);
            let notification = Arc::clone(&notification);
            tasks.spawn(async move {
                let result = delivery.deliver(&entry.token, &notification).await;
                DeliveryReport::from_result(&entry, result)
            });
        }

        let mut reports = Vec::with_capacity(tokens.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                // no report means the entry is kept
                Err(e) => error!("Delivery task failed: {}", e),
            }
        }
        reports
    }

    /// Notify every user with push enabled.
    ///
    /// Each registry is loaded inside its own cycle, so a user whose
    /// registry can't be read lands in `failed_users` and the rest still
    /// get the notification.
    pub async fn broadcast(
        &self,
        notification: &PushNotification,
    ) -> Result<BroadcastSummary, RegistryError> {
        let user_ids = self.store.list_user_ids().await?;
        let mut summary = BroadcastSummary::default();

        for user_id in &user_ids {
            match self.notify_user(user_id, notification).await {
                Ok(user_summary) if user_summary.skipped => {
                    debug!("Broadcast skipped user {}", user_id);
                }
                Ok(user_summary) => summary.users.push(user_summary),
                Err(e) => {
                    error!("Broadcast to user {} failed: {}", user_id, e);
                    summary.failed_users.push(user_id.clone());
                }
            }
        }

        info!(
            "Broadcast reached {} users ({} failed)",
            summary.users.len(),
            summary.failed_users.len()
        );
        Ok(summary)
    }
}
