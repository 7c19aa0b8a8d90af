// --- File: crates/services/pushkeeper_backend/src/app_state.rs ---
use crate::service_factory::PushkeeperServiceFactory;
use pushkeeper_common::{is_database_enabled, log_result, Context, PushkeeperError};
use pushkeeper_config::AppConfig;
use pushkeeper_db::{
    DbClient, DeviceTokenRegistryRepository, DeviceTokenRegistryRepositoryFactory,
    RepositoryFactory,
};
use pushkeeper_registry::{RegistryService, RegistryStore};
use std::sync::Arc;
use tracing::info;

/// Application state that is shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<RegistryService>,
}

impl AppState {
    /// Wire store and delivery provider from configuration.
    ///
    /// Uses the SQL store when `use_database` is set and a `database`
    /// section exists, otherwise an in-memory store.
    pub async fn from_config(config: Arc<AppConfig>) -> Result<Self, PushkeeperError> {
        let store = if is_database_enabled(&config) {
            let db_client = log_result(
                DbClient::new(&config).await,
                "Connected to database",
                "Database connection failed",
            )
            .map_err(|e| PushkeeperError::DatabaseError(e.to_string()))?;
            let repository = DeviceTokenRegistryRepositoryFactory::new().create_repository(db_client);
            RegistryStore::from(repository)
        } else {
            RegistryStore::in_memory()
        };

        store
            .init_schema()
            .await
            .context("initializing registry schema")?;
        info!("Using {} registry store", store.kind());

        let delivery = PushkeeperServiceFactory::new(&config).delivery_or_unconfigured();
        let registry = RegistryService::new(store, delivery, &config.registry);

        Ok(Self {
            config,
            registry: Arc::new(registry),
        })
    }
}
