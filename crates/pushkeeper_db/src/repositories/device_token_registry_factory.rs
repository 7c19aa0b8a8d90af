//! Factory for creating device token registry repositories

use crate::repositories::device_token_registry_sql::SqlDeviceTokenRegistryRepository;
use crate::{DbClient, RepositoryFactory};

/// Factory for creating SQL device token registry repositories
#[derive(Debug, Clone, Default)]
pub struct DeviceTokenRegistryRepositoryFactory;

impl DeviceTokenRegistryRepositoryFactory {
    /// Create a new device token registry repository factory
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlDeviceTokenRegistryRepository, DbClient>
    for DeviceTokenRegistryRepositoryFactory
{
    fn create_repository(&self, db_client: DbClient) -> SqlDeviceTokenRegistryRepository {
        SqlDeviceTokenRegistryRepository::new(db_client)
    }
}
