//! In-memory mailbox store for Vapormail.
//!
//! Keyed holder for active mailboxes. Every operation takes the single
//! store lock, so mutations are atomic to any concurrent reader: no caller
//! ever observes a partially purged or partially appended mailbox.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{Result, VapormailError};

use super::types::{Mailbox, Message, NewMessage};

/// Keyed holder for active mailboxes.
///
/// Intentionally memory-only: process restart loses all mailboxes, which is
/// a privacy property of the service, not a defect.
#[derive(Debug)]
pub struct MailboxStore {
    inner: Mutex<HashMap<String, Mailbox>>,
    max_messages: usize,
}

impl Default for MailboxStore {
    fn default() -> Self {
        Self::new(crate::config::MailboxConfig::default().max_messages)
    }
}

impl MailboxStore {
    /// Create a store with the given per-mailbox message cap.
    pub fn new(max_messages: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            max_messages,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Mailbox>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create an empty mailbox for an address.
    ///
    /// # Errors
    ///
    /// Returns `AddressInUse` if a live mailbox already exists for the
    /// address. The issuer's token space makes this statistically
    /// unreachable, but the store still checks.
    pub fn create(
        &self,
        address: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut mailboxes = self.lock();
        if mailboxes.contains_key(address) {
            return Err(VapormailError::AddressInUse(address.to_string()));
        }
        mailboxes.insert(
            address.to_string(),
            Mailbox::new(address, created_at, expires_at),
        );
        debug!(address = %address, "Mailbox created");
        Ok(())
    }

    /// Append an inbound message to a mailbox.
    ///
    /// The stored message gets a fresh monotonic ID, `is_read = false`, and
    /// the current time as arrival stamp. Returns a clone of the stored
    /// message.
    ///
    /// # Errors
    ///
    /// - `MailboxNotFound` if no active mailbox exists for the address.
    ///   Delivery after expiry lands here and is rejected immediately,
    ///   never queued.
    /// - `Validation` if the mailbox already holds the maximum number of
    ///   messages.
    pub fn deliver(&self, address: &str, message: NewMessage) -> Result<Message> {
        let mut mailboxes = self.lock();
        let mailbox = mailboxes
            .get_mut(address)
            .ok_or(VapormailError::MailboxNotFound)?;

        if mailbox.len() >= self.max_messages {
            return Err(VapormailError::Validation(format!(
                "mailbox is full ({} messages)",
                self.max_messages
            )));
        }

        let stored = mailbox.append(message, Utc::now());
        debug!(
            address = %address,
            message_id = stored.id,
            from = %stored.from,
            "Message delivered"
        );
        Ok(stored)
    }

    /// Set the read flag on a message. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `MailboxNotFound` or `MessageNotFound` when absent.
    pub fn mark_read(&self, address: &str, message_id: u64) -> Result<()> {
        let mut mailboxes = self.lock();
        let mailbox = mailboxes
            .get_mut(address)
            .ok_or(VapormailError::MailboxNotFound)?;
        let message = mailbox
            .message_mut(message_id)
            .ok_or(VapormailError::MessageNotFound)?;

        message.is_read = true;
        Ok(())
    }

    /// Atomically remove a mailbox and all of its contents.
    ///
    /// Idempotent: purging an absent address is a no-op. The entry is
    /// dropped wholesale, so no trace of prior content is retrievable by
    /// any later call.
    pub fn purge(&self, address: &str) {
        let mut mailboxes = self.lock();
        if let Some(mailbox) = mailboxes.remove(address) {
            debug!(
                address = %address,
                purged_messages = mailbox.len(),
                "Mailbox purged"
            );
        }
    }

    /// Read-only snapshot of a mailbox, or `None` when absent.
    pub fn get(&self, address: &str) -> Option<Mailbox> {
        self.lock().get(address).cloned()
    }

    /// Whether an active mailbox exists for the address.
    pub fn contains(&self, address: &str) -> bool {
        self.lock().contains_key(address)
    }

    /// Number of active mailboxes.
    pub fn mailbox_count(&self) -> usize {
        self.lock().len()
    }
}
