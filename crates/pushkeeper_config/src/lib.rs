//! Layered configuration for Pushkeeper.
//!
//! Sources, later ones winning:
//!
//! 1. `{config_dir}/default.{toml,yaml,json}`
//! 2. `{config_dir}/{RUN_ENV}.{toml,yaml,json}` (`RUN_ENV` defaults to `debug`)
//! 3. `PUSHKEEPER__SECTION__KEY` environment variables
//!
//! `config_dir` is `PUSHKEEPER_CONFIG_DIR` or `./config`. A `.env` file is
//! loaded once before anything is read, and `"secret_from_env"` values are
//! replaced from the environment afterwards (see [`env_vars`]).

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Loads the application configuration from the default config directory.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    let config_dir = env::var("PUSHKEEPER_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));
    load_config_from(&config_dir)
}

/// Loads the application configuration from `config_dir`.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "Loading config from {} and {} (prefix {})",
        default_path.display(),
        env_path.display(),
        prefix
    );

    let raw_config: AppConfig = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator(env_vars::CONFIG_SEPARATOR))
        .build()?
        .try_deserialize()?;

    apply_env_overrides_from_marker(raw_config)
}

/// Applies environment overrides based on "secret_from_env" markers in the
/// serialized config.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    if env_vars::inject_env_secrets(&mut json) {
        debug!("Injected secrets from environment");
    }
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, once.
///
/// The file is taken from `DOTENV_OVERRIDE`, else from the first command line
/// argument if it starts with `.env`, else `.env`. Returns the path used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let config = load_config_from(Path::new("does/not/exist")).unwrap();
        assert_eq!(config.registry.max_write_attempts, 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.firebase.is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = env::temp_dir().join(format!("pushkeeper-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("default.toml"),
            r#"
use_firebase = true

[server]
host = "0.0.0.0"
port = 9090

[firebase]
project_id = "demo-project"

[registry]
max_write_attempts = 5
"#,
        )
        .unwrap();

        let config = load_config_from(&dir).unwrap();
        assert!(config.use_firebase);
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.firebase.and_then(|f| f.project_id).as_deref(),
            Some("demo-project")
        );
        assert_eq!(config.registry.max_write_attempts, 5);

        std::fs::remove_dir_all(&dir).ok();
    }
}
