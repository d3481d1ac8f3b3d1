//! Response DTOs for the Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::mailbox::{Mailbox, Message};
use crate::session::{LifecycleSnapshot, SessionTicket};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Response to a started session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Issued mailbox address.
    pub address: String,
    /// Expiration timestamp (RFC 3339).
    pub expires_at: String,
}

impl From<SessionTicket> for SessionResponse {
    fn from(ticket: SessionTicket) -> Self {
        Self {
            address: ticket.address,
            expires_at: ticket.expires_at.to_rfc3339(),
        }
    }
}

/// Current session lifecycle state (poll form of the notification channel).
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStateResponse {
    /// Lifecycle state name.
    pub state: String,
    /// Active address, if a mailbox is live.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Expiration timestamp (RFC 3339), if a mailbox is live.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl From<LifecycleSnapshot> for SessionStateResponse {
    fn from(snapshot: LifecycleSnapshot) -> Self {
        Self {
            state: snapshot.state.as_str().to_string(),
            address: snapshot.address,
            expires_at: snapshot.expires_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// One row of an inbox snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageSummaryResponse {
    /// Message ID.
    pub id: u64,
    /// Sender address string.
    pub from: String,
    /// Message subject.
    pub subject: String,
    /// Clamped body preview.
    pub preview: String,
    /// Arrival timestamp (RFC 3339).
    pub received_at: String,
    /// Whether the message has been read.
    pub is_read: bool,
}

impl From<&Message> for MessageSummaryResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            from: message.from.clone(),
            subject: message.subject.clone(),
            preview: message.preview(),
            received_at: message.received_at.to_rfc3339(),
            is_read: message.is_read,
        }
    }
}

/// Inbox snapshot: all messages in arrival order.
#[derive(Debug, Serialize, ToSchema)]
pub struct InboxResponse {
    /// Owning address.
    pub address: String,
    /// Expiration timestamp (RFC 3339).
    pub expires_at: String,
    /// Number of unread messages.
    pub unread_count: usize,
    /// Messages in arrival order.
    pub messages: Vec<MessageSummaryResponse>,
}

impl From<&Mailbox> for InboxResponse {
    fn from(mailbox: &Mailbox) -> Self {
        Self {
            address: mailbox.address.clone(),
            expires_at: mailbox.expires_at.to_rfc3339(),
            unread_count: mailbox.unread_count(),
            messages: mailbox.messages().iter().map(Into::into).collect(),
        }
    }
}

/// Full message detail.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageDetailResponse {
    /// Message ID.
    pub id: u64,
    /// Sender address string.
    pub from: String,
    /// Message subject.
    pub subject: String,
    /// Full message body.
    pub body: String,
    /// Arrival timestamp (RFC 3339).
    pub received_at: String,
    /// Whether the message has been read.
    pub is_read: bool,
}

impl From<Message> for MessageDetailResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            from: message.from,
            subject: message.subject,
            body: message.body,
            received_at: message.received_at.to_rfc3339(),
            is_read: message.is_read,
        }
    }
}

/// Acknowledgement of an accepted inbound message.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveredResponse {
    /// Assigned message ID.
    pub id: u64,
}

/// Acknowledgement of a read-state change.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkReadResponse {
    /// Message ID.
    pub id: u64,
    /// Read flag after the operation.
    pub is_read: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_inbox_response_from_mailbox() {
        let now = Utc::now();
        let mut mailbox = Mailbox::new("abc@tempmail.com", now, now + chrono::Duration::minutes(10));
        mailbox.append(
            crate::mailbox::NewMessage::new("a@x.com", "one", "body one"),
            now,
        );
        mailbox.append(
            crate::mailbox::NewMessage::new("b@x.com", "two", "body two"),
            now,
        );

        let response = InboxResponse::from(&mailbox);
        assert_eq!(response.address, "abc@tempmail.com");
        assert_eq!(response.unread_count, 2);
        assert_eq!(response.messages.len(), 2);
        assert_eq!(response.messages[0].subject, "one");
        assert_eq!(response.messages[1].subject, "two");
    }

    #[test]
    fn test_summary_preview_clamped() {
        let now = Utc::now();
        let mut mailbox = Mailbox::new("abc@tempmail.com", now, now + chrono::Duration::minutes(10));
        let stored = mailbox.append(
            crate::mailbox::NewMessage::new("a@x.com", "s", "x".repeat(500)),
            now,
        );

        let summary = MessageSummaryResponse::from(&stored);
        assert!(summary.preview.chars().count() < 500);
    }
}
