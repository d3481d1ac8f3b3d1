//! Request DTOs for the Web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Request to start a new mailbox session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Requested mailbox lifetime in minutes (10, 30 or 60).
    pub ttl_minutes: u32,
}

/// An inbound message handed over at the ingestion boundary.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InboundMessageRequest {
    /// Sender address string.
    #[validate(length(min = 1, max = 254, message = "sender must be 1-254 characters"))]
    pub from: String,
    /// Message subject.
    #[validate(length(max = 100, message = "subject must be at most 100 characters"))]
    #[serde(default)]
    pub subject: String,
    /// Message body.
    #[validate(length(max = 10000, message = "body must be at most 10000 characters"))]
    #[serde(default)]
    pub body: String,
}
