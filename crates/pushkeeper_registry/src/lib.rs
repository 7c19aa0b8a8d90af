// Declare modules within this crate
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
#[cfg(test)]
mod logic_test;
pub mod repository;
pub mod routes;
pub mod service;

pub use logic::{reconcile, remove_device, upsert, Reconciliation};
pub use repository::RegistryStore;
pub use routes::routes;
pub use service::{BroadcastSummary, DeliverySummary, RegistryError, RegistryService};
