// --- File: crates/pushkeeper_common/src/models.rs ---
//! Data structures shared across the Pushkeeper crates.
//!
//! The registry types are what gets stored per user; the delivery types
//! carry the three-way outcome of a push attempt from the delivery provider
//! to the reconciler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A push token bound to one logical device of a user.
///
/// `device` is the stable identity chosen by the client ("iPhone", "Mac",
/// "Android"); `token` is issued by the messaging platform and may change at
/// any time for the same device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeviceTokenEntry {
    /// Opaque platform token
    pub token: String,

    /// Logical device identifier, unique within a registry
    pub device: String,

    /// When the token was issued (informational only)
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl DeviceTokenEntry {
    /// Create an entry issued now.
    pub fn new(device: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            device: device.into(),
            created_at: Utc::now(),
        }
    }
}

/// All push tokens of one user.
///
/// Invariant: at most one entry per distinct `device`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeviceTokenRegistry {
    /// Owner of the registry
    pub user_id: String,

    /// Whether delivery attempts should happen at all
    pub push_enabled: bool,

    /// Tokens in registration order
    pub tokens: Vec<DeviceTokenEntry>,

    /// Deprecated single-token field read by older clients.
    ///
    /// Always `tokens[0].token`, or `None` when `tokens` is empty.
    pub legacy_token: Option<String>,

    /// Write counter for optimistic concurrency, 0 until first stored
    pub version: i64,
}

impl DeviceTokenRegistry {
    /// An empty, not yet stored registry for `user_id`.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            push_enabled: false,
            tokens: Vec::new(),
            legacy_token: None,
            version: 0,
        }
    }

    /// Replace the token list and flag, refreshing the legacy mirror.
    pub fn apply(&mut self, tokens: Vec<DeviceTokenEntry>, push_enabled: bool) {
        self.legacy_token = tokens.first().map(|entry| entry.token.clone());
        self.tokens = tokens;
        self.push_enabled = push_enabled;
    }

    /// Look up the entry for a device.
    pub fn entry_for(&self, device: &str) -> Option<&DeviceTokenEntry> {
        self.tokens.iter().find(|entry| entry.device == device)
    }
}

/// What the platform said about one delivery attempt.
///
/// `Accepted` only means the platform took the message; it is not a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Delivered or accepted for delivery
    Accepted,
    /// The token will never accept deliveries again
    PermanentlyInvalid,
    /// The attempt failed, the token may still be valid
    TransientError,
}

impl DeliveryOutcome {
    /// Classify the result of a delivery call.
    pub fn from_result<T>(result: &Result<T, DeliveryFailure>) -> Self {
        match result {
            Ok(_) => DeliveryOutcome::Accepted,
            Err(DeliveryFailure::Permanent(_)) => DeliveryOutcome::PermanentlyInvalid,
            Err(DeliveryFailure::Transient(_)) => DeliveryOutcome::TransientError,
        }
    }
}

/// A failed delivery, split by whether the token is still usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryFailure {
    /// Token no longer registered or malformed
    #[error("token rejected permanently: {0}")]
    Permanent(String),

    /// Network, quota, server or authentication trouble
    #[error("transient delivery failure: {0}")]
    Transient(String),
}

/// The outcome of delivering to one registry entry.
///
/// Carries the exact `(device, token)` pair the attempt was made against so
/// that it can be matched against a fresher copy of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeliveryReport {
    pub device: String,
    pub token: String,
    pub outcome: DeliveryOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DeliveryReport {
    pub fn new(
        device: impl Into<String>,
        token: impl Into<String>,
        outcome: DeliveryOutcome,
    ) -> Self {
        Self {
            device: device.into(),
            token: token.into(),
            outcome,
            message_id: None,
            detail: None,
        }
    }

    /// Build a report from the delivery provider's result for `entry`.
    pub fn from_result(entry: &DeviceTokenEntry, result: Result<String, DeliveryFailure>) -> Self {
        let outcome = DeliveryOutcome::from_result(&result);
        let (message_id, detail) = match result {
            Ok(message_id) => (Some(message_id), None),
            Err(failure) => (None, Some(failure.to_string())),
        };
        Self {
            device: entry.device.clone(),
            token: entry.token.clone(),
            outcome,
            message_id,
            detail,
        }
    }

    /// Whether this report is about exactly `entry`.
    pub fn matches(&self, entry: &DeviceTokenEntry) -> bool {
        self.device == entry.device && self.token == entry.token
    }
}

/// Notification payload sent to every device of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Option<HashMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_refreshes_legacy_token() {
        let mut registry = DeviceTokenRegistry::new("user-1");
        registry.apply(
            vec![
                DeviceTokenEntry::new("iPhone", "t1"),
                DeviceTokenEntry::new("Mac", "t2"),
            ],
            true,
        );
        assert_eq!(registry.legacy_token.as_deref(), Some("t1"));
        assert!(registry.push_enabled);

        registry.apply(Vec::new(), false);
        assert_eq!(registry.legacy_token, None);
        assert!(!registry.push_enabled);
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: Result<String, DeliveryFailure> = Ok("projects/p/messages/1".to_string());
        let gone: Result<String, DeliveryFailure> =
            Err(DeliveryFailure::Permanent("UNREGISTERED".to_string()));
        let busy: Result<String, DeliveryFailure> =
            Err(DeliveryFailure::Transient("UNAVAILABLE".to_string()));

        assert_eq!(DeliveryOutcome::from_result(&ok), DeliveryOutcome::Accepted);
        assert_eq!(
            DeliveryOutcome::from_result(&gone),
            DeliveryOutcome::PermanentlyInvalid
        );
        assert_eq!(
            DeliveryOutcome::from_result(&busy),
            DeliveryOutcome::TransientError
        );
    }

    #[test]
    fn test_report_matches_device_and_token() {
        let entry = DeviceTokenEntry::new("Android", "t-old");
        let report = DeliveryReport::from_result(
            &entry,
            Err(DeliveryFailure::Permanent("UNREGISTERED".to_string())),
        );
        assert!(report.matches(&entry));
        assert!(report.detail.is_some());

        let rotated = DeviceTokenEntry::new("Android", "t-new");
        assert!(!report.matches(&rotated));
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let json = serde_json::to_string(&DeliveryOutcome::PermanentlyInvalid).unwrap();
        assert_eq!(json, "\"permanently_invalid\"");
    }
}
