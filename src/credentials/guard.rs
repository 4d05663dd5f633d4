//! Credential validity checks.
//!
//! Two distinct rules are applied to the same stored token:
//! - navigation uses a buffered check: tokens expiring within the buffer
//!   window are already treated as invalid;
//! - startup uses a strict check: only tokens past their expiry are removed.
//!
//! Both checks fail closed and purge the slot when they reject a token.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::credentials::storage::CredentialSlot;
use crate::credentials::token::{decode_claims, TokenError};

/// Outcome of the startup purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPurge {
    /// Nothing stored.
    Empty,
    /// Token kept.
    Kept,
    /// Token was past its expiry and was removed.
    Expired,
    /// Token could not be decoded and was removed.
    Malformed,
}

/// Decides whether the stored credential is usable.
#[derive(Debug, Clone)]
pub struct CredentialGuard {
    slot: CredentialSlot,
    clock: Arc<dyn Clock>,
    buffer: Duration,
}

impl CredentialGuard {
    pub fn new(slot: CredentialSlot, clock: Arc<dyn Clock>, buffer: Duration) -> Self {
        Self { slot, clock, buffer }
    }

    pub fn slot(&self) -> &CredentialSlot {
        &self.slot
    }

    /// Buffered check. Rejected tokens are purged from storage.
    pub fn is_valid(&self, token: &str) -> bool {
        let now = self.clock.now_secs();
        let expiry = match decode_claims(token).and_then(|c| c.expiry()) {
            Ok(exp) => exp,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid token format, clearing stored credential");
                self.slot.purge(purge_reason(&e));
                return false;
            }
        };

        if expiry < now + self.buffer.as_secs() as i64 {
            tracing::info!(
                expiry,
                now,
                "Token expired or expiring soon, clearing stored credential"
            );
            self.slot.purge("expiring");
            return false;
        }

        true
    }

    /// The stored token, if it passes the buffered check.
    pub fn current_valid_token(&self) -> Option<String> {
        let token = self.slot.get()?;
        self.is_valid(&token).then_some(token)
    }

    /// Strict check run once at bootstrap.
    pub fn purge_expired_on_startup(&self) -> StartupPurge {
        let Some(token) = self.slot.get() else {
            return StartupPurge::Empty;
        };

        match decode_claims(&token).and_then(|c| c.expiry()) {
            Ok(exp) if exp < self.clock.now_secs() => {
                self.slot.purge("expired");
                tracing::info!("Cleared expired token on startup");
                StartupPurge::Expired
            }
            Ok(_) => StartupPurge::Kept,
            Err(e) => {
                self.slot.purge(purge_reason(&e));
                tracing::info!(error = %e, "Cleared invalid token on startup");
                StartupPurge::Malformed
            }
        }
    }
}

fn purge_reason(err: &TokenError) -> &'static str {
    match err {
        TokenError::MissingExpiry => "missing_expiry",
        _ => "malformed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::credentials::token::encode_unsigned;
    use serde_json::json;

    fn guard_at(now_secs: u64) -> (CredentialGuard, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now_secs * 1000));
        let guard = CredentialGuard::new(
            CredentialSlot::in_memory(),
            clock.clone(),
            Duration::from_secs(300),
        );
        (guard, clock)
    }

    fn token_expiring_at(exp: i64) -> String {
        encode_unsigned(&json!({ "exp": exp, "sub": "user-1" }))
    }

    #[test]
    fn test_token_inside_buffer_is_rejected_and_purged() {
        let now = 1_700_000_000;
        let (guard, _) = guard_at(now);
        let token = token_expiring_at(now as i64 + 100);
        guard.slot().set(&token).unwrap();

        assert!(!guard.is_valid(&token));
        assert!(guard.slot().get().is_none());
    }

    #[test]
    fn test_token_beyond_buffer_is_valid() {
        let now = 1_700_000_000;
        let (guard, _) = guard_at(now);
        let token = token_expiring_at(now as i64 + 3600);
        guard.slot().set(&token).unwrap();

        assert!(guard.is_valid(&token));
        assert_eq!(guard.current_valid_token(), Some(token));
    }

    #[test]
    fn test_numeric_subject_token_is_kept() {
        let now = 1_700_000_000;
        let (guard, _) = guard_at(now);
        let token =
            encode_unsigned(&json!({ "exp": now + 3600, "sub": 42, "iat": now as f64 + 0.5 }));
        guard.slot().set(&token).unwrap();

        assert!(guard.is_valid(&token));
        assert_eq!(guard.slot().get(), Some(token));
        assert_eq!(guard.purge_expired_on_startup(), StartupPurge::Kept);
    }

    #[test]
    fn test_buffer_edge() {
        let now = 1_700_000_000;
        let (guard, _) = guard_at(now);
        // exp == now + buffer is not "less than", so still valid.
        assert!(guard.is_valid(&token_expiring_at(now as i64 + 300)));
        assert!(!guard.is_valid(&token_expiring_at(now as i64 + 299)));
    }

    #[test]
    fn test_malformed_token_fails_closed() {
        let (guard, _) = guard_at(1_700_000_000);
        guard.slot().set("garbage").unwrap();

        assert!(!guard.is_valid("garbage"));
        assert!(guard.slot().get().is_none());
        assert_eq!(guard.current_valid_token(), None);
    }

    #[test]
    fn test_missing_expiry_fails_closed() {
        let (guard, _) = guard_at(1_700_000_000);
        let token = encode_unsigned(&json!({ "sub": "user-1" }));
        guard.slot().set(&token).unwrap();

        assert!(!guard.is_valid(&token));
        assert!(guard.slot().get().is_none());
    }

    #[test]
    fn test_startup_purge_is_strict() {
        let now = 1_700_000_000;
        let (guard, clock) = guard_at(now);
        assert_eq!(guard.purge_expired_on_startup(), StartupPurge::Empty);

        // Inside the navigation buffer, but not yet expired: kept at startup.
        let token = token_expiring_at(now as i64 + 100);
        guard.slot().set(&token).unwrap();
        assert_eq!(guard.purge_expired_on_startup(), StartupPurge::Kept);
        assert_eq!(guard.slot().get(), Some(token));

        clock.advance(Duration::from_secs(101));
        assert_eq!(guard.purge_expired_on_startup(), StartupPurge::Expired);
        assert!(guard.slot().get().is_none());
    }

    #[test]
    fn test_startup_purge_removes_malformed() {
        let (guard, _) = guard_at(1_700_000_000);
        guard.slot().set("a.b").unwrap();
        assert_eq!(guard.purge_expired_on_startup(), StartupPurge::Malformed);
        assert!(guard.slot().get().is_none());
    }
}
