//! Repository modules for database access

pub mod device_token_registry;
pub mod device_token_registry_factory;
pub mod device_token_registry_memory;
pub mod device_token_registry_sql;

pub use device_token_registry::{
    DeviceTokenEntry, DeviceTokenRegistry, DeviceTokenRegistryRepository,
};
pub use device_token_registry_factory::DeviceTokenRegistryRepositoryFactory;
pub use device_token_registry_memory::InMemoryDeviceTokenRegistryRepository;
pub use device_token_registry_sql::SqlDeviceTokenRegistryRepository;
