//! Session handlers for the Web API.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, SessionResponse, SessionStateResponse, StartSessionRequest};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/session - Start a new mailbox session.
#[utoipa::path(
    post,
    path = "/api/session",
    tag = "session",
    request_body = StartSessionRequest,
    responses(
        (status = 200, description = "Session started", body = SessionResponse),
        (status = 422, description = "TTL outside the allowed set"),
        (status = 500, description = "Address generation failed")
    )
)]
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let ticket = state.engine.start(request.ttl_minutes)?;
    Ok(Json(ApiResponse::new(ticket.into())))
}

/// GET /api/session - Current session lifecycle state.
///
/// Poll endpoint the UI uses to learn about expiration and offer a reset.
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "session",
    responses(
        (status = 200, description = "Current lifecycle state", body = SessionStateResponse)
    )
)]
pub async fn session_state(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<SessionStateResponse>> {
    Json(ApiResponse::new(state.engine.snapshot().into()))
}
