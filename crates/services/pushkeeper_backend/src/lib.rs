// File: crates/services/pushkeeper_backend/src/lib.rs
pub mod app_state;
pub mod service_factory;

use app_state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let store = state.registry.store();
    let healthy = store.is_healthy().await;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unavailable" },
            "store": store.kind(),
        })),
    )
}

/// Build the full HTTP application.
pub fn app(state: AppState) -> Router {
    let registry_router = pushkeeper_registry::routes(state.registry.clone());

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Pushkeeper API!" }))
        .route("/health", get(health))
        .with_state(state)
        .merge(registry_router);

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use pushkeeper_registry::doc::RegistryApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Pushkeeper API",
                version = "0.1.0",
                description = "Multi-device push token registry",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(RegistryApiDoc::openapi());
        tracing::info!("Adding Swagger UI at /api/docs");
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    app.layer(TraceLayer::new_for_http())
}
