// --- File: crates/pushkeeper_registry/src/logic.rs ---
//! Pure token list operations.
//!
//! Nothing here touches storage or the network. The service loads a
//! registry, runs these functions on its token list and writes the result
//! back under a version check.

use pushkeeper_common::models::{DeliveryOutcome, DeliveryReport, DeviceTokenEntry};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of folding delivery outcomes into a token list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Reconciliation {
    /// Surviving entries in their original order
    pub tokens: Vec<DeviceTokenEntry>,
    /// `false` when `tokens` is empty, otherwise the input flag
    pub push_enabled: bool,
    /// Entries dropped because the platform rejected them for good
    pub removed: Vec<DeviceTokenEntry>,
}

impl Reconciliation {
    /// Whether the token list changed.
    pub fn changed(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// Drop every entry whose delivery came back permanently invalid.
///
/// Outcomes are matched to entries by `(device, token)`, so their order is
/// irrelevant and a report about a token the device has since replaced
/// removes nothing. Entries without a report are kept.
pub fn reconcile(
    tokens: &[DeviceTokenEntry],
    outcomes: &[DeliveryReport],
    push_enabled: bool,
) -> Reconciliation {
    let (kept, removed): (Vec<DeviceTokenEntry>, Vec<DeviceTokenEntry>) =
        tokens.iter().cloned().partition(|entry| {
            !outcomes.iter().any(|report| {
                report.outcome == DeliveryOutcome::PermanentlyInvalid && report.matches(entry)
            })
        });

    for entry in &removed {
        debug!("Dropping permanently invalid token for device {}", entry.device);
    }

    let push_enabled = push_enabled && !kept.is_empty();
    Reconciliation {
        tokens: kept,
        push_enabled,
        removed,
    }
}

/// Insert or replace the entry for `new_entry.device`.
///
/// The first entry for that device is replaced in place, any further ones
/// are dropped. An unknown device is appended.
pub fn upsert(tokens: &[DeviceTokenEntry], new_entry: DeviceTokenEntry) -> Vec<DeviceTokenEntry> {
    let device = new_entry.device.clone();
    let mut pending = Some(new_entry);
    let mut updated = Vec::with_capacity(tokens.len() + 1);

    for entry in tokens {
        if entry.device != device {
            updated.push(entry.clone());
        } else if let Some(new_entry) = pending.take() {
            updated.push(new_entry);
        }
    }

    if let Some(new_entry) = pending {
        updated.push(new_entry);
    }
    updated
}

/// Remove the entry for `device`, keeping the order of the rest.
pub fn remove_device(tokens: &[DeviceTokenEntry], device: &str) -> Vec<DeviceTokenEntry> {
    tokens
        .iter()
        .filter(|entry| entry.device != device)
        .cloned()
        .collect()
}
