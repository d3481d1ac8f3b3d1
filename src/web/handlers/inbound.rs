//! Inbound delivery handler - the ingestion boundary.
//!
//! A mail-receiving front-end (an SMTP gateway in a real deployment) posts
//! messages here. The front-end itself is out of scope.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::mailbox::NewMessage;
use crate::web::dto::{ApiResponse, DeliveredResponse, InboundMessageRequest};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/inbound/{address} - Deliver an inbound message.
#[utoipa::path(
    post,
    path = "/api/inbound/{address}",
    tag = "inbound",
    params(
        ("address" = String, Path, description = "Recipient mailbox address")
    ),
    request_body = InboundMessageRequest,
    responses(
        (status = 200, description = "Message accepted", body = DeliveredResponse),
        (status = 404, description = "No active mailbox - delivery rejected, not queued"),
        (status = 422, description = "Message failed validation")
    )
)]
pub async fn deliver_inbound(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Json(request): Json<InboundMessageRequest>,
) -> Result<Json<ApiResponse<DeliveredResponse>>, ApiError> {
    request
        .validate()
        .map_err(ApiError::from_validation_errors)?;

    let message = state.engine.deliver(
        &address,
        NewMessage::new(request.from, request.subject, request.body),
    )?;

    Ok(Json(ApiResponse::new(DeliveredResponse { id: message.id })))
}
