use pushkeeper_common::{DeliveryFailure, PushDeliveryService, PushNotification};
use pushkeeper_config::FirebaseConfig;
use pushkeeper_firebase::FirebaseClient;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEND_PATH: &str = "/v1/projects/demo-project/messages:send";

fn client_for(server: &MockServer) -> FirebaseClient {
    let config = FirebaseConfig {
        project_id: Some("demo-project".to_string()),
        access_token: Some("test-token".to_string()),
        api_base_url: Some(server.uri()),
        request_timeout_secs: Some(5),
        ..Default::default()
    };
    FirebaseClient::new(&config).unwrap()
}

fn notification() -> PushNotification {
    PushNotification {
        title: "New message".to_string(),
        body: "You have mail".to_string(),
        data: None,
    }
}

#[tokio::test]
async fn accepted_message_returns_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "projects/demo-project/messages/0:1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).deliver("t1", &notification()).await;
    assert_eq!(result.unwrap(), "projects/demo-project/messages/0:1");
}

#[tokio::test]
async fn unregistered_token_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "status": "NOT_FOUND",
                "details": [{
                    "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                    "errorCode": "UNREGISTERED"
                }]
            }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).deliver("t-old", &notification()).await;
    assert!(matches!(result, Err(DeliveryFailure::Permanent(_))));
}

#[tokio::test]
async fn unavailable_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {
                "code": 503,
                "message": "The service is currently unavailable.",
                "status": "UNAVAILABLE"
            }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).deliver("t1", &notification()).await;
    assert!(matches!(result, Err(DeliveryFailure::Transient(_))));
}

#[tokio::test]
async fn wrong_endpoint_404_is_transient() {
    let server = MockServer::start().await;
    let config = FirebaseConfig {
        project_id: Some("demo-project".to_string()),
        access_token: Some("test-token".to_string()),
        api_base_url: Some(format!("{}/wrong-prefix", server.uri())),
        request_timeout_secs: Some(5),
        ..Default::default()
    };
    let client = FirebaseClient::new(&config).unwrap();

    let result = client.deliver("healthy-token", &notification()).await;
    assert!(matches!(result, Err(DeliveryFailure::Transient(_))));
}

#[tokio::test]
async fn unreachable_server_is_transient() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    drop(server);

    let result = client.deliver("t1", &notification()).await;
    assert!(matches!(result, Err(DeliveryFailure::Transient(_))));
}
