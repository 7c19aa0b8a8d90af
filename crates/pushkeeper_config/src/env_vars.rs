//! Environment variable naming for the Pushkeeper configuration.
//!
//! Plain settings are read as `PUSHKEEPER__SECTION__KEY`, secrets as
//! `PUSHKEEPER_SECRET_SECTION_KEY` with a fallback to the bare
//! `SECTION_KEY` form (e.g. `FIREBASE_ACCESS_TOKEN`).

use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "PUSHKEEPER";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "PUSHKEEPER_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value in config files that is replaced from the environment
pub const SECRET_MARKER: &str = "secret_from_env";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PUSHKEEPER_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path (e.g. `server.host`) to an environment
/// variable name (e.g. `PUSHKEEPER__SERVER__HOST`).
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path (e.g. `firebase.access_token`) to an environment
/// variable name (e.g. `PUSHKEEPER_SECRET_FIREBASE_ACCESS_TOKEN`).
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to its unprefixed form (`FIREBASE_ACCESS_TOKEN`).
pub fn bare_secret_path_to_env_var(path: &str) -> String {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() < 2 {
        return path.to_uppercase();
    }

    let section = parts[0];
    let key = parts[1..].join(SECRET_SEPARATOR);
    format!("{}_{}", section, key).to_uppercase()
}

/// Look up a secret, preferring the prefixed name.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    if let Ok(value) = env::var(secret_path_to_env_var(path)) {
        return Some(value);
    }
    env::var(bare_secret_path_to_env_var(path)).ok()
}

/// Recursively replaces every `"secret_from_env"` string in `value` with the
/// matching secret environment variable.
///
/// Returns `true` if at least one marker was replaced. Markers without a
/// matching variable are left untouched and logged.
pub fn inject_env_secrets(value: &mut serde_json::Value) -> bool {
    use serde_json::Value;

    fn walk(path: &mut Vec<String>, obj: &mut Value) -> bool {
        let mut replaced = false;

        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    path.push(k.to_string());
                    replaced |= walk(path, v);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                if let Some(env_val) = get_secret_env_var(&path_str) {
                    *s = env_val;
                    replaced = true;
                } else {
                    warn!("No environment variable found for secret {}", path_str);
                }
            }
            _ => {}
        }

        replaced
    }

    walk(&mut Vec::new(), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_to_env_var() {
        assert_eq!(
            config_path_to_env_var("server.host"),
            "PUSHKEEPER__SERVER__HOST"
        );
        assert_eq!(
            config_path_to_env_var("registry.max_write_attempts"),
            "PUSHKEEPER__REGISTRY__MAX_WRITE_ATTEMPTS"
        );
    }

    #[test]
    fn test_secret_path_to_env_var() {
        assert_eq!(
            secret_path_to_env_var("firebase.access_token"),
            "PUSHKEEPER_SECRET_FIREBASE_ACCESS_TOKEN"
        );
    }

    #[test]
    fn test_bare_secret_path_to_env_var() {
        assert_eq!(
            bare_secret_path_to_env_var("firebase.access_token"),
            "FIREBASE_ACCESS_TOKEN"
        );
        assert_eq!(bare_secret_path_to_env_var("token"), "TOKEN");
    }

    #[test]
    fn test_inject_env_secrets_replaces_marker() {
        std::env::set_var(
            "PUSHKEEPER_SECRET_FIREBASE_KEY_PATH",
            "/run/secrets/fcm.json",
        );
        let mut value = serde_json::json!({
            "firebase": { "key_path": "secret_from_env", "project_id": "demo" }
        });

        assert!(inject_env_secrets(&mut value));
        assert_eq!(value["firebase"]["key_path"], "/run/secrets/fcm.json");
        assert_eq!(value["firebase"]["project_id"], "demo");
    }

    #[test]
    fn test_inject_env_secrets_keeps_unresolved_marker() {
        let mut value = serde_json::json!({
            "nowhere": { "unset_secret_for_test": "secret_from_env" }
        });

        assert!(!inject_env_secrets(&mut value));
        assert_eq!(value["nowhere"]["unset_secret_for_test"], SECRET_MARKER);
    }
}
