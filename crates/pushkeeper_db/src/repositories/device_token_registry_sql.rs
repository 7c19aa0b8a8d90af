//! SQL implementation of the device token registry repository
//!
//! One row per user. The token list is kept as a JSON array in a single
//! column so that tokens, the push flag and the legacy token are replaced by
//! one `UPDATE ... WHERE version = ?`.

use crate::error::DbError;
use crate::repositories::device_token_registry::{
    DeviceTokenEntry, DeviceTokenRegistry, DeviceTokenRegistryRepository,
};
use crate::DbClient;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the device token registry repository
#[derive(Debug, Clone)]
pub struct SqlDeviceTokenRegistryRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlDeviceTokenRegistryRepository {
    /// Create a new SQL device token registry repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Whether the underlying database answers.
    pub async fn is_healthy(&self) -> bool {
        self.db_client.is_healthy().await
    }
}

// DateTime<Utc> and bool don't decode reliably through sqlx::Any, so the
// flag is stored as an integer and timestamps live inside the JSON column.
// Any can't decode NULL either; the SELECT folds a NULL legacy token to ''.
fn registry_from_row(row: &AnyRow) -> Result<DeviceTokenRegistry, DbError> {
    let tokens_json: String = row.try_get("tokens")?;
    let tokens: Vec<DeviceTokenEntry> = serde_json::from_str(&tokens_json)?;
    let push_enabled: i64 = row.try_get("push_enabled")?;
    let legacy_token: String = row.try_get("legacy_token")?;

    Ok(DeviceTokenRegistry {
        user_id: row.try_get("user_id")?,
        push_enabled: push_enabled != 0,
        tokens,
        legacy_token: Some(legacy_token).filter(|t| !t.is_empty()),
        version: row.try_get("version")?,
    })
}

fn encode_tokens(registry: &DeviceTokenRegistry) -> Result<String, DbError> {
    Ok(serde_json::to_string(&registry.tokens)?)
}

impl DeviceTokenRegistryRepository for SqlDeviceTokenRegistryRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing device token registry schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS device_token_registries (
                user_id TEXT PRIMARY KEY,
                push_enabled BIGINT NOT NULL DEFAULT 0,
                tokens TEXT NOT NULL,
                legacy_token TEXT,
                version BIGINT NOT NULL
            )
        "#;

        self.db_client.execute(query).await?;

        info!("Device token registry schema initialized successfully");
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<DeviceTokenRegistry>, DbError> {
        debug!("Finding device token registry for user: {}", user_id);

        let query = r#"
            SELECT user_id, push_enabled, tokens, COALESCE(legacy_token, '') AS legacy_token, version
            FROM device_token_registries
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find device token registry: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(registry_from_row).transpose()
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, DbError> {
        debug!("Listing users with a device token registry");

        let query = r#"
            SELECT user_id
            FROM device_token_registries
            ORDER BY user_id
        "#;

        let rows = sqlx::query(query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list device token registries: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("user_id").map_err(DbError::from))
            .collect()
    }

    async fn insert_registry(&self, registry: &DeviceTokenRegistry) -> Result<bool, DbError> {
        debug!("Creating device token registry for user: {}", registry.user_id);

        // NULLIF keeps NULL binds away from the Any driver
        let query = r#"
            INSERT INTO device_token_registries (user_id, push_enabled, tokens, legacy_token, version)
            VALUES ($1, $2, $3, NULLIF($4, ''), 1)
            ON CONFLICT (user_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(registry.user_id.as_str())
            .bind(i64::from(registry.push_enabled))
            .bind(encode_tokens(registry)?)
            .bind(registry.legacy_token.clone().unwrap_or_default())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert device token registry: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() == 1)
    }

    async fn replace_registry(
        &self,
        registry: &DeviceTokenRegistry,
        expected_version: i64,
    ) -> Result<bool, DbError> {
        debug!(
            "Replacing device token registry for user: {} at version {}",
            registry.user_id, expected_version
        );

        let query = r#"
            UPDATE device_token_registries
            SET push_enabled = $1, tokens = $2, legacy_token = NULLIF($3, ''), version = version + 1
            WHERE user_id = $4 AND version = $5
        "#;

        let result = sqlx::query(query)
            .bind(i64::from(registry.push_enabled))
            .bind(encode_tokens(registry)?)
            .bind(registry.legacy_token.clone().unwrap_or_default())
            .bind(registry.user_id.as_str())
            .bind(expected_version)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to replace device token registry: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_registry(&self, user_id: &str) -> Result<bool, DbError> {
        debug!("Deleting device token registry for user: {}", user_id);

        let query = r#"
            DELETE FROM device_token_registries
            WHERE user_id = $1
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete device token registry: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
