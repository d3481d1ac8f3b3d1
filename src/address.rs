//! Address issuance for Vapormail.
//!
//! Issues opaque disposable addresses with a cryptographically sourced
//! random local part and a domain drawn from a configured pool.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::config::MailboxConfig;
use crate::{Result, VapormailError};

/// Characters used for the random local part of an address.
///
/// 32 characters, so each sampled byte contributes exactly 5 bits.
const TOKEN_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Source of fresh disposable addresses.
///
/// The store enforces true uniqueness; an issuer only has to make
/// collisions statistically negligible. Implementations must not have side
/// effects beyond randomness consumption, so a real mail-receiving
/// front-end can substitute its own allocation scheme.
pub trait AddressIssuer: Send + Sync {
    /// Produce a fresh address.
    fn issue(&self) -> Result<String>;
}

/// Issuer backed by the operating system entropy source.
#[derive(Debug, Clone)]
pub struct TokenAddressIssuer {
    domains: Vec<String>,
    token_length: usize,
}

impl TokenAddressIssuer {
    /// Create an issuer with the given domain pool and local-part length.
    pub fn new(domains: Vec<String>, token_length: usize) -> Self {
        Self {
            domains,
            token_length,
        }
    }

    /// Create an issuer from mailbox configuration.
    pub fn from_config(config: &MailboxConfig) -> Self {
        Self::new(config.domains.clone(), config.token_length)
    }
}

impl Default for TokenAddressIssuer {
    fn default() -> Self {
        Self::from_config(&MailboxConfig::default())
    }
}

impl AddressIssuer for TokenAddressIssuer {
    /// Issue a fresh address: a random local part and a random pool domain.
    ///
    /// # Errors
    ///
    /// Returns `Generation` if the OS entropy source fails. This is treated
    /// as a fatal configuration problem and is not retried here.
    fn issue(&self) -> Result<String> {
        let mut bytes = vec![0u8; self.token_length + 1];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| VapormailError::Generation(format!("entropy source failure: {e}")))?;

        let domain_index = bytes[0] as usize % self.domains.len();
        let local: String = bytes[1..]
            .iter()
            .map(|b| TOKEN_ALPHABET[(b & 0x1f) as usize] as char)
            .collect();

        Ok(format!("{}@{}", local, self.domains[domain_index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_shape() {
        let issuer = TokenAddressIssuer::default();
        let address = issuer.issue().unwrap();

        let (local, domain) = address.split_once('@').unwrap();
        assert_eq!(local.len(), 16);
        assert!(local.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
        assert!(MailboxConfig::default()
            .domains
            .contains(&domain.to_string()));
    }

    #[test]
    fn test_issue_unique() {
        let issuer = TokenAddressIssuer::default();

        let a = issuer.issue().unwrap();
        let b = issuer.issue().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_issue_custom_pool() {
        let issuer = TokenAddressIssuer::new(vec!["example.test".to_string()], 20);
        let address = issuer.issue().unwrap();

        let (local, domain) = address.split_once('@').unwrap();
        assert_eq!(local.len(), 20);
        assert_eq!(domain, "example.test");
    }
}
