//! Router configuration for the Web API.

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    deliver_inbound, get_inbox, get_message, mark_read, session_state, start_session, AppState,
};

/// OpenAPI description of the Vapormail API.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::handlers::session::start_session,
        crate::web::handlers::session::session_state,
        crate::web::handlers::inbox::get_inbox,
        crate::web::handlers::inbox::get_message,
        crate::web::handlers::inbox::mark_read,
        crate::web::handlers::inbound::deliver_inbound,
    ),
    components(schemas(
        crate::web::dto::StartSessionRequest,
        crate::web::dto::InboundMessageRequest,
        crate::web::dto::SessionResponse,
        crate::web::dto::SessionStateResponse,
        crate::web::dto::InboxResponse,
        crate::web::dto::MessageSummaryResponse,
        crate::web::dto::MessageDetailResponse,
        crate::web::dto::DeliveredResponse,
        crate::web::dto::MarkReadResponse,
        crate::web::error::ErrorBody,
        crate::web::error::ErrorDetail,
        crate::web::error::ErrorCode,
    )),
    tags(
        (name = "session", description = "Mailbox session lifecycle"),
        (name = "inbox", description = "Inbox snapshots and read state"),
        (name = "inbound", description = "Inbound message ingestion")
    )
)]
struct ApiDoc;

/// Create a CORS layer from configured origins.
///
/// No configured origins means permissive mode (development).
fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let parsed_origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    if parsed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(Any)
            .allow_origin(Any)
    } else {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(Any)
            .allow_origin(parsed_origins)
    }
}

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let inbox_routes = Router::new()
        .route("/:address", get(get_inbox))
        .route("/:address/messages/:id", get(get_message))
        .route("/:address/messages/:id/read", post(mark_read));

    let inbound_routes = Router::new().route("/:address", post(deliver_inbound));

    let api_routes = Router::new()
        .route("/session", post(start_session).get(session_state))
        .nest("/inbox", inbox_routes)
        .nest("/inbound", inbound_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
        // Should not panic
    }

    #[test]
    fn test_create_cors_layer() {
        let _layer = create_cors_layer(&[]);
        let _layer = create_cors_layer(&["http://localhost:3000".to_string()]);
        // Should not panic
    }

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/session"));
        assert!(doc.paths.paths.contains_key("/api/inbound/{address}"));
    }
}
