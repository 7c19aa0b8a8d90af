//! Authentication for Firebase Cloud Messaging
//!
//! Requests carry an OAuth2 bearer token with the `firebase.messaging`
//! scope. It comes either from a service account key file or, for
//! emulators and tests, straight from configuration.

use crate::client::FirebaseError;
use pushkeeper_config::env_vars::SECRET_MARKER;
use pushkeeper_config::FirebaseConfig;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;
use yup_oauth2::{read_service_account_key, AccessToken, ServiceAccountAuthenticator};

/// OAuth2 scope required by the FCM HTTP v1 API
pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// A value counts as set unless empty or still an unresolved secret marker.
pub(crate) fn configured(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != SECRET_MARKER)
}

/// Source of bearer tokens for FCM requests
pub enum FirebaseAuth {
    /// A pre-issued token, used as is
    Static(String),
    /// Tokens minted from a service account key, cached until they expire
    ServiceAccount {
        key_path: String,
        cached: Mutex<Option<AccessToken>>,
    },
}

impl FirebaseAuth {
    /// Pick the token source from configuration.
    ///
    /// A configured `access_token` wins over `key_path`.
    pub fn from_config(config: &FirebaseConfig) -> Result<Self, FirebaseError> {
        if let Some(token) = configured(config.access_token.as_deref()) {
            return Ok(FirebaseAuth::Static(token.to_string()));
        }

        let key_path = configured(config.key_path.as_deref()).ok_or_else(|| {
            FirebaseError::ConfigError(
                "Missing key_path or access_token in FirebaseConfig".to_string(),
            )
        })?;

        Ok(FirebaseAuth::ServiceAccount {
            key_path: key_path.to_string(),
            cached: Mutex::new(None),
        })
    }

    /// A bearer token valid for the next request.
    pub async fn bearer_token(&self) -> Result<String, FirebaseError> {
        match self {
            FirebaseAuth::Static(token) => Ok(token.clone()),
            FirebaseAuth::ServiceAccount { key_path, cached } => {
                let mut cached = cached.lock().await;
                if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
                    if let Some(value) = token.token() {
                        return Ok(value.to_string());
                    }
                }

                debug!("Requesting new FCM access token");
                let fresh = get_firebase_auth_token(key_path).await?;
                let value = fresh
                    .token()
                    .map(str::to_string)
                    .ok_or_else(|| FirebaseError::AuthError("No token available".to_string()))?;
                *cached = Some(fresh);
                Ok(value)
            }
        }
    }
}

/// Exchange a service account key for an access token with the FCM scope.
pub async fn get_firebase_auth_token(key_path: &str) -> Result<AccessToken, FirebaseError> {
    let sa_key = read_service_account_key(Path::new(key_path))
        .await
        .map_err(|e| FirebaseError::AuthError(format!("Cannot read service account key: {}", e)))?;

    let auth = ServiceAccountAuthenticator::builder(sa_key)
        .build()
        .await
        .map_err(|e| FirebaseError::AuthError(e.to_string()))?;

    auth.token(&[FCM_SCOPE])
        .await
        .map_err(|e| FirebaseError::AuthError(e.to_string()))
}
