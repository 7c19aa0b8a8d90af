//! Store selection for the registry service.

use pushkeeper_db::{
    DbError, DeviceTokenRegistry, DeviceTokenRegistryRepository,
    InMemoryDeviceTokenRegistryRepository, SqlDeviceTokenRegistryRepository,
};

/// The store backing a [`crate::service::RegistryService`].
///
/// SQL when a database is configured, otherwise process memory.
#[derive(Debug, Clone)]
pub enum RegistryStore {
    Sql(SqlDeviceTokenRegistryRepository),
    InMemory(InMemoryDeviceTokenRegistryRepository),
}

impl RegistryStore {
    /// A fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        RegistryStore::InMemory(InMemoryDeviceTokenRegistryRepository::new())
    }

    /// Whether the store can serve requests.
    pub async fn is_healthy(&self) -> bool {
        match self {
            RegistryStore::Sql(repository) => repository.is_healthy().await,
            RegistryStore::InMemory(_) => true,
        }
    }

    /// Short name for logs and health output.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryStore::Sql(_) => "sql",
            RegistryStore::InMemory(_) => "memory",
        }
    }
}

impl From<SqlDeviceTokenRegistryRepository> for RegistryStore {
    fn from(repository: SqlDeviceTokenRegistryRepository) -> Self {
        RegistryStore::Sql(repository)
    }
}

impl From<InMemoryDeviceTokenRegistryRepository> for RegistryStore {
    fn from(repository: InMemoryDeviceTokenRegistryRepository) -> Self {
        RegistryStore::InMemory(repository)
    }
}

impl DeviceTokenRegistryRepository for RegistryStore {
    async fn init_schema(&self) -> Result<(), DbError> {
        match self {
            RegistryStore::Sql(repository) => repository.init_schema().await,
            RegistryStore::InMemory(repository) => repository.init_schema().await,
        }
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<DeviceTokenRegistry>, DbError> {
        match self {
            RegistryStore::Sql(repository) => repository.find_by_user(user_id).await,
            RegistryStore::InMemory(repository) => repository.find_by_user(user_id).await,
        }
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, DbError> {
        match self {
            RegistryStore::Sql(repository) => repository.list_user_ids().await,
            RegistryStore::InMemory(repository) => repository.list_user_ids().await,
        }
    }

    async fn insert_registry(&self, registry: &DeviceTokenRegistry) -> Result<bool, DbError> {
        match self {
            RegistryStore::Sql(repository) => repository.insert_registry(registry).await,
            RegistryStore::InMemory(repository) => repository.insert_registry(registry).await,
        }
    }

    async fn replace_registry(
        &self,
        registry: &DeviceTokenRegistry,
        expected_version: i64,
    ) -> Result<bool, DbError> {
        match self {
            RegistryStore::Sql(repository) => {
                repository.replace_registry(registry, expected_version).await
            }
            RegistryStore::InMemory(repository) => {
                repository.replace_registry(registry, expected_version).await
            }
        }
    }

    async fn delete_registry(&self, user_id: &str) -> Result<bool, DbError> {
        match self {
            RegistryStore::Sql(repository) => repository.delete_registry(user_id).await,
            RegistryStore::InMemory(repository) => repository.delete_registry(user_id).await,
        }
    }
}
