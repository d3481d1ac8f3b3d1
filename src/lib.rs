//! Vapormail - disposable mailbox engine.
//!
//! Issues short-lived anonymous mailbox addresses, accepts inbound
//! messages for them, and guarantees irreversible, time-bounded
//! destruction of both the address and its contents. Intentionally
//! memory-only: a process restart loses every mailbox, which is a privacy
//! property of the service.

pub mod address;
pub mod config;
pub mod error;
pub mod expiry;
pub mod logging;
pub mod mailbox;
pub mod session;
pub mod web;

pub use address::{AddressIssuer, TokenAddressIssuer};
pub use config::Config;
pub use error::{Result, VapormailError};
pub use expiry::ExpirationScheduler;
pub use mailbox::{Mailbox, MailboxStore, Message, NewMessage};
pub use session::{
    LifecycleSnapshot, SessionEngine, SessionState, SessionTicket, ALLOWED_TTL_MINUTES,
};
pub use web::WebServer;
