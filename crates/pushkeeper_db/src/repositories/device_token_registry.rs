//! Repository for device token registries
//!
//! A registry is stored as one unit per user. Writes are conditional on the
//! version that was read, so two devices registering at the same instant
//! cannot silently overwrite each other: the loser sees `false` and has to
//! re-read and try again.

use crate::error::DbError;

pub use pushkeeper_common::models::{DeviceTokenEntry, DeviceTokenRegistry};

/// Storage for [`DeviceTokenRegistry`] values with read-then-conditional-update
/// semantics.
pub trait DeviceTokenRegistryRepository {
    /// Create the backing tables if they don't exist yet.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Find the registry of a user.
    fn find_by_user(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<DeviceTokenRegistry>, DbError>> + Send;

    /// Ids of all users with a stored registry, in ascending order.
    fn list_user_ids(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, DbError>> + Send;

    /// Store a registry that does not exist yet.
    ///
    /// The stored version is 1 regardless of `registry.version`. Returns
    /// `false` if a registry for the user already exists.
    fn insert_registry(
        &self,
        registry: &DeviceTokenRegistry,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    /// Replace tokens, push flag and legacy token in one step.
    ///
    /// Succeeds only if the stored version still equals `expected_version`;
    /// the stored version then becomes `expected_version + 1`. Returns
    /// `false` on a version mismatch or if the registry is gone.
    fn replace_registry(
        &self,
        registry: &DeviceTokenRegistry,
        expected_version: i64,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    /// Delete the registry of a user. Returns `true` if one was deleted.
    fn delete_registry(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}
