//! In-memory device token registry repository
//!
//! Used when no database is configured and in tests. Same conditional-write
//! rules as the SQL store; nothing survives a restart.

use crate::error::DbError;
use crate::repositories::device_token_registry::{
    DeviceTokenRegistry, DeviceTokenRegistryRepository,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Registries held in a shared map. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeviceTokenRegistryRepository {
    registries: Arc<RwLock<HashMap<String, DeviceTokenRegistry>>>,
}

impl InMemoryDeviceTokenRegistryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceTokenRegistryRepository for InMemoryDeviceTokenRegistryRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<DeviceTokenRegistry>, DbError> {
        Ok(self.registries.read().await.get(user_id).cloned())
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, DbError> {
        let mut users: Vec<String> = self.registries.read().await.keys().cloned().collect();
        users.sort();
        Ok(users)
    }

    async fn insert_registry(&self, registry: &DeviceTokenRegistry) -> Result<bool, DbError> {
        let mut registries = self.registries.write().await;
        if registries.contains_key(&registry.user_id) {
            debug!("Registry for user {} already exists", registry.user_id);
            return Ok(false);
        }

        let mut stored = registry.clone();
        stored.version = 1;
        registries.insert(stored.user_id.clone(), stored);
        Ok(true)
    }

    async fn replace_registry(
        &self,
        registry: &DeviceTokenRegistry,
        expected_version: i64,
    ) -> Result<bool, DbError> {
        let mut registries = self.registries.write().await;
        let Some(current) = registries.get_mut(&registry.user_id) else {
            return Ok(false);
        };
        if current.version != expected_version {
            debug!(
                "Version mismatch for user {}: expected {}, found {}",
                registry.user_id, expected_version, current.version
            );
            return Ok(false);
        }

        current.push_enabled = registry.push_enabled;
        current.tokens = registry.tokens.clone();
        current.legacy_token = registry.legacy_token.clone().filter(|t| !t.is_empty());
        current.version = expected_version + 1;
        Ok(true)
    }

    async fn delete_registry(&self, user_id: &str) -> Result<bool, DbError> {
        Ok(self.registries.write().await.remove(user_id).is_some())
    }
}
