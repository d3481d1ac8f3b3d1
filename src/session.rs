//! Session lifecycle orchestration for Vapormail.
//!
//! A session binds the address issuer, the mailbox store, and the
//! expiration scheduler into one state machine:
//! `Idle -> Activating -> Active -> Expiring -> Expired -> Idle`.
//! At most one mailbox is live per session; starting a new session
//! abandons and purges the previous one before the next address is bound.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::address::{AddressIssuer, TokenAddressIssuer};
use crate::config::MailboxConfig;
use crate::expiry::ExpirationScheduler;
use crate::mailbox::{Mailbox, MailboxStore, Message, NewMessage, MAX_BODY_LENGTH, MAX_SUBJECT_LENGTH};
use crate::{Result, VapormailError};

/// Mailbox lifetimes callers may request, in minutes.
pub const ALLOWED_TTL_MINUTES: [u32; 3] = [10, 30, 60];

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No mailbox; ready to issue one.
    Idle,
    /// Issuing an address and binding a mailbox.
    Activating,
    /// Mailbox live and accepting deliveries.
    Active,
    /// Expiration fired; purge in progress.
    Expiring,
    /// Mailbox destroyed; expired notice shown until the grace period ends.
    Expired,
}

impl SessionState {
    /// Stable lowercase name for logs and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Activating => "activating",
            SessionState::Active => "active",
            SessionState::Expiring => "expiring",
            SessionState::Expired => "expired",
        }
    }
}

/// Observable snapshot of the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSnapshot {
    /// Current state.
    pub state: SessionState,
    /// Active address, if a mailbox is live.
    pub address: Option<String>,
    /// Expiration time of the active mailbox, if any.
    pub expires_at: Option<DateTime<Utc>>,
}

impl LifecycleSnapshot {
    fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            address: None,
            expires_at: None,
        }
    }
}

/// Result of starting a session: the issued address and its deadline.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    /// Issued mailbox address.
    pub address: String,
    /// When the mailbox will be destroyed.
    pub expires_at: DateTime<Utc>,
}

struct SessionInner {
    state: SessionState,
    address: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    /// Bumped on every activation; expiry and reset callbacks carry the
    /// epoch they were scheduled under and no-op when it is stale. This
    /// resolves the abandon/expire race to exactly one purge.
    epoch: u64,
}

struct EngineShared {
    inner: Mutex<SessionInner>,
    store: Arc<MailboxStore>,
    issuer: Box<dyn AddressIssuer>,
    scheduler: ExpirationScheduler,
    grace: Duration,
    state_tx: watch::Sender<LifecycleSnapshot>,
}

impl EngineShared {
    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, inner: &SessionInner) {
        self.state_tx.send_replace(LifecycleSnapshot {
            state: inner.state,
            address: inner.address.clone(),
            expires_at: inner.expires_at,
        });
    }

    /// Expiration callback, scheduled at activation.
    fn expire(self: Arc<Self>, address: String, epoch: u64) {
        let mut inner = self.lock();
        if inner.epoch != epoch || inner.state != SessionState::Active {
            debug!(address = %address, "Stale expiration ignored");
            return;
        }

        inner.state = SessionState::Expiring;
        self.notify(&inner);

        self.store.purge(&address);

        inner.state = SessionState::Expired;
        inner.address = None;
        inner.expires_at = None;
        self.notify(&inner);
        info!(address = %address, "Mailbox expired and purged");

        // Brief expired notice, then back to idle.
        let reset_at = Utc::now() + chrono::Duration::from_std(self.grace).unwrap_or_default();
        let shared = Arc::clone(&self);
        self.scheduler
            .schedule(&address, reset_at, move || shared.reset(epoch));
    }

    /// Grace-period callback: return to idle after the expired notice.
    fn reset(self: Arc<Self>, epoch: u64) {
        let mut inner = self.lock();
        if inner.epoch != epoch || inner.state != SessionState::Expired {
            debug!("Stale reset ignored");
            return;
        }
        inner.state = SessionState::Idle;
        self.notify(&inner);
        debug!("Session reset to idle");
    }
}

/// The state machine governing one mailbox's full lifecycle.
///
/// Cheap to clone; clones share the same session. One engine instance
/// exists per user-facing flow and is passed into handlers explicitly, so
/// a future multi-session deployment can arena-index engines by session
/// key without touching this type.
#[derive(Clone)]
pub struct SessionEngine {
    shared: Arc<EngineShared>,
}

impl SessionEngine {
    /// Create an engine with the default OS-entropy address issuer.
    pub fn new(config: &MailboxConfig) -> Self {
        Self::with_issuer(config, Box::new(TokenAddressIssuer::from_config(config)))
    }

    /// Create an engine with a custom address issuer.
    pub fn with_issuer(config: &MailboxConfig, issuer: Box<dyn AddressIssuer>) -> Self {
        let (state_tx, _) = watch::channel(LifecycleSnapshot::idle());
        Self {
            shared: Arc::new(EngineShared {
                inner: Mutex::new(SessionInner {
                    state: SessionState::Idle,
                    address: None,
                    expires_at: None,
                    epoch: 0,
                }),
                store: Arc::new(MailboxStore::new(config.max_messages)),
                issuer,
                scheduler: ExpirationScheduler::new(),
                grace: Duration::from_secs(config.grace_secs),
                state_tx,
            }),
        }
    }

    /// Start a session: issue an address, bind an empty mailbox, register
    /// its expiration deadline.
    ///
    /// An already-active mailbox is abandoned first: its deadline is
    /// cancelled and its contents purged before the new address is bound,
    /// so two live mailboxes never coexist.
    ///
    /// # Errors
    ///
    /// - `InvalidDuration` if `ttl_minutes` is not one of
    ///   [`ALLOWED_TTL_MINUTES`].
    /// - `Generation` if address issuance or mailbox creation fails; the
    ///   session reverts to idle with no orphaned mailbox or timer.
    pub fn start(&self, ttl_minutes: u32) -> Result<SessionTicket> {
        if !ALLOWED_TTL_MINUTES.contains(&ttl_minutes) {
            return Err(VapormailError::InvalidDuration(ttl_minutes));
        }

        let shared = &self.shared;
        let mut inner = shared.lock();

        // Abandon the current mailbox, if any. Bumping the epoch first
        // makes a concurrently firing expiration a no-op even when the
        // cancel loses the race at the deadline instant.
        inner.epoch += 1;
        if let Some(old) = inner.address.take() {
            shared.scheduler.cancel(&old);
            shared.store.purge(&old);
            info!(address = %old, "Abandoned active mailbox");
        }

        inner.state = SessionState::Activating;
        inner.expires_at = None;
        shared.notify(&inner);

        let address = match shared.issuer.issue() {
            Ok(address) => address,
            Err(e) => {
                warn!(error = %e, "Address issuance failed");
                inner.state = SessionState::Idle;
                shared.notify(&inner);
                return Err(e);
            }
        };

        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(i64::from(ttl_minutes));

        if let Err(e) = shared.store.create(&address, now, expires_at) {
            warn!(address = %address, error = %e, "Mailbox creation failed");
            inner.state = SessionState::Idle;
            shared.notify(&inner);
            return Err(VapormailError::Generation(e.to_string()));
        }

        let epoch = inner.epoch;
        let callback_shared = Arc::clone(shared);
        let callback_address = address.clone();
        shared.scheduler.schedule(&address, expires_at, move || {
            callback_shared.expire(callback_address, epoch);
        });

        inner.state = SessionState::Active;
        inner.address = Some(address.clone());
        inner.expires_at = Some(expires_at);
        shared.notify(&inner);

        info!(
            address = %address,
            ttl_minutes,
            expires_at = %expires_at,
            "Session activated"
        );

        Ok(SessionTicket {
            address,
            expires_at,
        })
    }

    /// Deliver an inbound message to the active mailbox for `address`.
    ///
    /// Validates sender and size limits, then appends. Delivery to an
    /// expired or unknown address fails with `MailboxNotFound` immediately;
    /// nothing is queued.
    pub fn deliver(&self, address: &str, message: NewMessage) -> Result<Message> {
        let from = message.from.trim();
        if from.is_empty() {
            return Err(VapormailError::Validation(
                "sender must not be empty".to_string(),
            ));
        }
        if message.subject.chars().count() > MAX_SUBJECT_LENGTH {
            return Err(VapormailError::Validation(format!(
                "subject exceeds {MAX_SUBJECT_LENGTH} characters"
            )));
        }
        if message.body.chars().count() > MAX_BODY_LENGTH {
            return Err(VapormailError::Validation(format!(
                "body exceeds {MAX_BODY_LENGTH} characters"
            )));
        }

        let message = NewMessage::new(from, message.subject.trim(), message.body);
        self.shared.store.deliver(address, message)
    }

    /// Read-only snapshot of the mailbox for `address`.
    ///
    /// # Errors
    ///
    /// Returns `MailboxNotFound` for absent or expired addresses.
    pub fn inbox_snapshot(&self, address: &str) -> Result<Mailbox> {
        self.shared
            .store
            .get(address)
            .ok_or(VapormailError::MailboxNotFound)
    }

    /// Full message by ID.
    pub fn message(&self, address: &str, message_id: u64) -> Result<Message> {
        let mailbox = self.inbox_snapshot(address)?;
        mailbox
            .message(message_id)
            .cloned()
            .ok_or(VapormailError::MessageNotFound)
    }

    /// Mark a message read. Idempotent.
    pub fn mark_read(&self, address: &str, message_id: u64) -> Result<()> {
        self.shared.store.mark_read(address, message_id)
    }

    /// Current lifecycle snapshot (poll form of the notification channel).
    pub fn snapshot(&self) -> LifecycleSnapshot {
        self.shared.state_tx.borrow().clone()
    }

    /// Subscribe to lifecycle transitions (push form).
    pub fn subscribe(&self) -> watch::Receiver<LifecycleSnapshot> {
        self.shared.state_tx.subscribe()
    }
}
