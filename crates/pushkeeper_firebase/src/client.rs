//! Firebase Cloud Messaging client module
//!
//! Sends one message to one registration token over the FCM HTTP v1 API and
//! classifies the answer into the three-way delivery outcome. Only answers
//! that say the token itself is gone or foreign count as permanent; quota,
//! server and network trouble never costs a user a device.

use crate::auth::{configured, FirebaseAuth};
use pushkeeper_common::http::client::{create_client, DEFAULT_TIMEOUT_SECS};
use pushkeeper_common::{BoxFuture, DeliveryFailure, PushDeliveryService, PushNotification};
use pushkeeper_config::FirebaseConfig;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Production FCM endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://fcm.googleapis.com";

/// Errors that can occur when interacting with the Firebase Cloud Messaging API
#[derive(Error, Debug)]
pub enum FirebaseError {
    /// Error during authentication with Firebase
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to Firebase API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// FCM says the registration token will never work again
    #[error("Registration token rejected ({status}): {message}")]
    TokenRejected { status: String, message: String },

    /// Any other error answer from FCM
    #[error("Firebase API error ({http_status}): {message}")]
    ApiError { http_status: u16, message: String },
}

impl FirebaseError {
    /// Whether the token that was used should be dropped.
    pub fn is_permanent(&self) -> bool {
        matches!(self, FirebaseError::TokenRejected { .. })
    }
}

impl From<FirebaseError> for DeliveryFailure {
    fn from(error: FirebaseError) -> Self {
        if error.is_permanent() {
            DeliveryFailure::Permanent(error.to_string())
        } else {
            DeliveryFailure::Transient(error.to_string())
        }
    }
}

/// A message to be sent via Firebase Cloud Messaging
#[derive(Debug, Serialize)]
pub struct FcmMessage {
    pub message: Message,
}

/// The message payload for Firebase Cloud Messaging
#[derive(Debug, Serialize)]
pub struct Message {
    /// Registration token of the target device
    pub token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,

    /// Custom key-value data for the client app
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
}

/// The notification to be displayed on the user's device
#[derive(Debug, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl FcmMessage {
    /// Wrap a notification for a single token.
    pub fn for_token(token: &str, notification: &PushNotification) -> Self {
        Self {
            message: Message {
                token: token.to_string(),
                notification: Some(Notification {
                    title: notification.title.clone(),
                    body: notification.body.clone(),
                }),
                data: notification.data.clone(),
            },
        }
    }
}

/// Response from the Firebase Cloud Messaging API after a successful send
#[derive(Debug, Deserialize)]
pub struct FcmResponse {
    /// "projects/{project_id}/messages/{message_id}"
    pub name: String,
}

/// Error body returned by Google APIs
#[derive(Debug, Default, Deserialize)]
pub struct FcmErrorResponse {
    #[serde(default)]
    pub error: FcmErrorBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct FcmErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<FcmErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FcmErrorDetail {
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<String>,
}

impl FcmErrorBody {
    /// The FCM specific error code, falling back to the generic status.
    pub fn error_code(&self) -> &str {
        self.details
            .iter()
            .find_map(|d| d.error_code.as_deref())
            .unwrap_or(self.status.as_str())
    }
}

/// Classify a non-2xx answer from FCM.
///
/// Only an FCM error code that names the token makes the answer permanent.
/// A 404 without one comes from a wrong URL or project, not from the token.
pub fn classify_error(http_status: StatusCode, body: &str) -> FirebaseError {
    let parsed: FcmErrorResponse = serde_json::from_str(body).unwrap_or_default();
    let error = parsed.error;
    let code = error.error_code().to_string();
    let message = if error.message.is_empty() {
        body.to_string()
    } else {
        error.message.clone()
    };

    let token_rejected = match code.as_str() {
        "UNREGISTERED" | "SENDER_ID_MISMATCH" => true,
        "INVALID_ARGUMENT" => message.to_ascii_lowercase().contains("registration token"),
        _ => false,
    };

    if token_rejected {
        FirebaseError::TokenRejected {
            status: code,
            message,
        }
    } else {
        FirebaseError::ApiError {
            http_status: http_status.as_u16(),
            message,
        }
    }
}

/// Client for the Firebase Cloud Messaging HTTP v1 API
pub struct FirebaseClient {
    client: Client,
    auth: FirebaseAuth,
    project_id: String,
    api_base_url: String,
}

impl FirebaseClient {
    /// Creates a new Firebase client with the given configuration
    ///
    /// # Errors
    ///
    /// Fails if `project_id` is missing, if neither `access_token` nor
    /// `key_path` is set, or if the HTTP client cannot be built.
    pub fn new(config: &FirebaseConfig) -> Result<Self, FirebaseError> {
        let project_id = configured(config.project_id.as_deref())
            .ok_or_else(|| {
                FirebaseError::ConfigError("Missing project_id in FirebaseConfig".to_string())
            })?
            .to_string();

        let api_base_url = config
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        let client = create_client(config.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))?;

        Ok(Self {
            client,
            auth: FirebaseAuth::from_config(config)?,
            project_id,
            api_base_url,
        })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.api_base_url, self.project_id
        )
    }

    /// Sends a push notification message via Firebase Cloud Messaging
    ///
    /// Returns the message name on success.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use pushkeeper_common::PushNotification;
    /// use pushkeeper_config::FirebaseConfig;
    /// use pushkeeper_firebase::client::{FcmMessage, FirebaseClient};
    ///
    /// async fn send() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = FirebaseConfig {
    ///         project_id: Some("my-project-id".to_string()),
    ///         key_path: Some("/path/to/service-account.json".to_string()),
    ///         ..Default::default()
    ///     };
    ///     let client = FirebaseClient::new(&config)?;
    ///     let notification = PushNotification {
    ///         title: "Hello".to_string(),
    ///         body: "World".to_string(),
    ///         data: None,
    ///     };
    ///     let name = client
    ///         .send_message(FcmMessage::for_token("device-token", &notification))
    ///         .await?;
    ///     println!("Message sent: {}", name);
    ///     Ok(())
    /// }
    /// ```
    pub async fn send_message(&self, message: FcmMessage) -> Result<String, FirebaseError> {
        let token = self.auth.bearer_token().await?;

        let response = self
            .client
            .post(self.send_url())
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error = classify_error(status, &error_text);
            warn!("FCM rejected message: {}", error);
            return Err(error);
        }

        let fcm_response: FcmResponse = response.json().await?;
        debug!("FCM accepted message {}", fcm_response.name);
        Ok(fcm_response.name)
    }
}

impl PushDeliveryService for FirebaseClient {
    fn deliver<'a>(
        &'a self,
        token: &'a str,
        notification: &'a PushNotification,
    ) -> BoxFuture<'a, String, DeliveryFailure> {
        Box::pin(async move {
            self.send_message(FcmMessage::for_token(token, notification))
                .await
                .map_err(DeliveryFailure::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_is_permanent() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND","details":[{"@type":"type.googleapis.com/google.firebase.fcm.v1.FcmError","errorCode":"UNREGISTERED"}]}}"#;
        let error = classify_error(StatusCode::NOT_FOUND, body);
        assert!(error.is_permanent());
        assert!(error.to_string().contains("UNREGISTERED"));
    }

    #[test]
    fn test_invalid_registration_token_is_permanent() {
        let body = r#"{"error":{"code":400,"message":"The registration token is not a valid FCM registration token","status":"INVALID_ARGUMENT","details":[{"errorCode":"INVALID_ARGUMENT"}]}}"#;
        assert!(classify_error(StatusCode::BAD_REQUEST, body).is_permanent());
    }

    #[test]
    fn test_invalid_payload_is_not_permanent() {
        let body = r#"{"error":{"code":400,"message":"Invalid JSON payload received.","status":"INVALID_ARGUMENT"}}"#;
        assert!(!classify_error(StatusCode::BAD_REQUEST, body).is_permanent());
    }

    #[test]
    fn test_sender_id_mismatch_is_permanent() {
        let body = r#"{"error":{"code":403,"message":"SenderId mismatch","status":"PERMISSION_DENIED","details":[{"errorCode":"SENDER_ID_MISMATCH"}]}}"#;
        assert!(classify_error(StatusCode::FORBIDDEN, body).is_permanent());
    }

    #[test]
    fn test_server_and_quota_errors_are_transient() {
        let unavailable = r#"{"error":{"code":503,"message":"The service is currently unavailable.","status":"UNAVAILABLE"}}"#;
        let quota = r#"{"error":{"code":429,"message":"Quota exceeded.","status":"RESOURCE_EXHAUSTED","details":[{"errorCode":"QUOTA_EXCEEDED"}]}}"#;

        assert!(!classify_error(StatusCode::SERVICE_UNAVAILABLE, unavailable).is_permanent());
        assert!(!classify_error(StatusCode::TOO_MANY_REQUESTS, quota).is_permanent());
        assert!(!classify_error(StatusCode::INTERNAL_SERVER_ERROR, "oops").is_permanent());
    }

    #[test]
    fn test_404_without_fcm_error_code_is_transient() {
        let not_found = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;

        assert!(!classify_error(StatusCode::NOT_FOUND, "").is_permanent());
        assert!(!classify_error(StatusCode::NOT_FOUND, "<html>Not Found</html>").is_permanent());
        assert!(!classify_error(StatusCode::NOT_FOUND, not_found).is_permanent());
    }

    #[test]
    fn test_missing_project_id_is_rejected() {
        let config = FirebaseConfig {
            access_token: Some("token".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            FirebaseClient::new(&config),
            Err(FirebaseError::ConfigError(_))
        ));
    }

    #[test]
    fn test_message_serialization() {
        let notification = PushNotification {
            title: "Hi".to_string(),
            body: "There".to_string(),
            data: None,
        };
        let json = serde_json::to_value(FcmMessage::for_token("t1", &notification)).unwrap();
        assert_eq!(json["message"]["token"], "t1");
        assert_eq!(json["message"]["notification"]["title"], "Hi");
        assert!(json["message"].get("data").is_none());
    }
}
