//! Mailbox and message types for Vapormail.

use chrono::{DateTime, Utc};

/// Maximum length for a message subject.
pub const MAX_SUBJECT_LENGTH: usize = 100;

/// Maximum length for a message body.
pub const MAX_BODY_LENGTH: usize = 10000;

/// Number of characters of the body shown in inbox snapshot rows.
pub const PREVIEW_LENGTH: usize = 120;

/// A message held in a mailbox.
#[derive(Debug, Clone)]
pub struct Message {
    /// Message ID, monotonically assigned within its mailbox.
    pub id: u64,
    /// Sender address string.
    pub from: String,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// When the message arrived.
    pub received_at: DateTime<Utc>,
    /// Whether the message has been read.
    pub is_read: bool,
}

impl Message {
    /// Body preview for inbox listings, clamped to [`PREVIEW_LENGTH`] chars.
    pub fn preview(&self) -> String {
        if self.body.chars().count() <= PREVIEW_LENGTH {
            self.body.clone()
        } else {
            self.body.chars().take(PREVIEW_LENGTH).collect()
        }
    }
}

/// An inbound message before delivery.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Sender address string.
    pub from: String,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub body: String,
}

impl NewMessage {
    /// Create a new inbound message.
    pub fn new(from: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// The mutable container of messages bound to one issued address.
///
/// Messages are append-only in arrival order while the mailbox is active.
/// Expiration removes the mailbox from the store entirely; an expired
/// mailbox is never observable with contents.
#[derive(Debug, Clone)]
pub struct Mailbox {
    /// Owning address.
    pub address: String,
    /// When the mailbox was created.
    pub created_at: DateTime<Utc>,
    /// When the mailbox expires.
    pub expires_at: DateTime<Utc>,
    messages: Vec<Message>,
    next_message_id: u64,
}

impl Mailbox {
    /// Create an empty mailbox bound to an address.
    pub fn new(
        address: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            address: address.into(),
            created_at,
            expires_at,
            messages: Vec::new(),
            next_message_id: 1,
        }
    }

    /// Append an inbound message, assigning it the next monotonic ID.
    ///
    /// Returns a clone of the stored message.
    pub(crate) fn append(&mut self, new: NewMessage, received_at: DateTime<Utc>) -> Message {
        let message = Message {
            id: self.next_message_id,
            from: new.from,
            subject: new.subject,
            body: new.body,
            received_at,
            is_read: false,
        };
        self.next_message_id += 1;
        self.messages.push(message.clone());
        message
    }

    /// Messages in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Look up a message by ID.
    pub fn message(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Look up a message by ID for mutation.
    pub(crate) fn message_mut(&mut self, id: u64) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Number of messages held.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the mailbox holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of unread messages.
    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_read).count()
    }
}
