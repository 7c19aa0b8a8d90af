//! Database integration for Pushkeeper
//!
//! Provides a database-agnostic client on top of the SQLx `Any` driver and
//! the device token registry store. SQLite is the default backend; PostgreSQL
//! is available through the `postgres` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use pushkeeper_db::{DbClient, DeviceTokenRegistryRepository, SqlDeviceTokenRegistryRepository};
//!
//! async fn setup() -> Result<SqlDeviceTokenRegistryRepository, pushkeeper_db::DbError> {
//!     let client = DbClient::from_url("sqlite:data/pushkeeper.db", None).await?;
//!     let repository = SqlDeviceTokenRegistryRepository::new(client);
//!     repository.init_schema().await?;
//!     Ok(repository)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;
pub mod repository;

pub use client::DbClient;
pub use error::DbError;
pub use repository::RepositoryFactory;

pub use repositories::{
    DeviceTokenEntry, DeviceTokenRegistry, DeviceTokenRegistryRepository,
    DeviceTokenRegistryRepositoryFactory, InMemoryDeviceTokenRegistryRepository,
    SqlDeviceTokenRegistryRepository,
};
