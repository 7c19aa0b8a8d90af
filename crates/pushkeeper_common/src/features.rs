//! Runtime feature flags.
//!
//! Compile-time features (`openapi`, `sqlite`, `postgres`) select code; the
//! `use_*` flags in [`AppConfig`] decide at startup whether a configured
//! integration is actually wired in.

use pushkeeper_config::AppConfig;

/// A feature is enabled when its flag is set and its section is present.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Whether deliveries go through Firebase Cloud Messaging.
pub fn is_firebase_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_firebase, config.firebase.as_ref())
}

/// Whether registries are persisted in the SQL database.
pub fn is_database_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_database, config.database.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushkeeper_config::{DatabaseConfig, FirebaseConfig};

    #[test]
    fn test_flag_without_section_is_disabled() {
        let config = AppConfig {
            use_firebase: true,
            ..AppConfig::default()
        };
        assert!(!is_firebase_enabled(&config));
    }

    #[test]
    fn test_flag_with_section_is_enabled() {
        let config = AppConfig {
            use_firebase: true,
            use_database: false,
            firebase: Some(FirebaseConfig::default()),
            database: Some(DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            }),
            ..AppConfig::default()
        };
        assert!(is_firebase_enabled(&config));
        assert!(!is_database_enabled(&config));
    }
}
