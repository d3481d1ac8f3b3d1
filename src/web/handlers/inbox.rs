//! Inbox handlers for the Web API.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, InboxResponse, MarkReadResponse, MessageDetailResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/inbox/{address} - Inbox snapshot in arrival order.
#[utoipa::path(
    get,
    path = "/api/inbox/{address}",
    tag = "inbox",
    params(
        ("address" = String, Path, description = "Mailbox address")
    ),
    responses(
        (status = 200, description = "Inbox snapshot", body = InboxResponse),
        (status = 404, description = "No active mailbox for the address")
    )
)]
pub async fn get_inbox(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<InboxResponse>>, ApiError> {
    let mailbox = state.engine.inbox_snapshot(&address)?;
    Ok(Json(ApiResponse::new(InboxResponse::from(&mailbox))))
}

/// GET /api/inbox/{address}/messages/{id} - Full message body.
#[utoipa::path(
    get,
    path = "/api/inbox/{address}/messages/{id}",
    tag = "inbox",
    params(
        ("address" = String, Path, description = "Mailbox address"),
        ("id" = u64, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Full message", body = MessageDetailResponse),
        (status = 404, description = "No such mailbox or message")
    )
)]
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    Path((address, id)): Path<(String, u64)>,
) -> Result<Json<ApiResponse<MessageDetailResponse>>, ApiError> {
    let message = state.engine.message(&address, id)?;
    Ok(Json(ApiResponse::new(message.into())))
}

/// POST /api/inbox/{address}/messages/{id}/read - Mark a message read.
#[utoipa::path(
    post,
    path = "/api/inbox/{address}/messages/{id}/read",
    tag = "inbox",
    params(
        ("address" = String, Path, description = "Mailbox address"),
        ("id" = u64, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Message marked read", body = MarkReadResponse),
        (status = 404, description = "No such mailbox or message")
    )
)]
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path((address, id)): Path<(String, u64)>,
) -> Result<Json<ApiResponse<MarkReadResponse>>, ApiError> {
    state.engine.mark_read(&address, id)?;
    Ok(Json(ApiResponse::new(MarkReadResponse { id, is_read: true })))
}
