//! Firebase Cloud Messaging delivery for Pushkeeper
//!
//! Sends notifications through the FCM HTTP v1 API and reports each attempt
//! as accepted, permanently invalid or transiently failed, so that the
//! registry only ever drops tokens FCM has actually disowned.
//!
//! # Example
//!
//! ```rust,no_run
//! use pushkeeper_common::ServiceFactory;
//! use pushkeeper_config::AppConfig;
//! use pushkeeper_firebase::FirebaseServiceFactory;
//!
//! let config = AppConfig::default();
//! let delivery = FirebaseServiceFactory::new(&config).delivery_service();
//! ```

pub mod auth;
pub mod client;
pub mod service;

pub use client::{FirebaseClient, FirebaseError};
pub use service::FirebaseServiceFactory;
