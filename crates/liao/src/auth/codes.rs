//! Verification-code store.
//!
//! Codes are short-lived and single-use. The store is a trait so the
//! in-process map can be swapped for a shared cache without touching the
//! login/reset flows.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::Rng;
use thiserror::Error;

/// Verification code failures, in the order the checks run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    /// No code was requested for this phone.
    #[error("verification code not requested")]
    NotRequested,

    /// Presented code does not match the stored one.
    #[error("verification code mismatch")]
    Mismatch,

    /// Code matched but its validity window has passed.
    #[error("verification code expired")]
    Expired,
}

/// Store for pending verification codes.
pub trait CodeStore: Send + Sync {
    /// Store a code for a phone, replacing any pending one.
    fn put(&self, phone: &str, code: String, ttl: Duration);

    /// Check a presented code. Consumes the stored code on success or expiry;
    /// a mismatch leaves it in place for a retry.
    fn verify_and_consume(&self, phone: &str, code: &str) -> Result<(), CodeError>;
}

struct StoredCode {
    code: String,
    expires_at: Instant,
}

/// In-process code store backed by a concurrent map.
#[derive(Default)]
pub struct InMemoryCodeStore {
    codes: DashMap<String, StoredCode>,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CodeStore for InMemoryCodeStore {
    fn put(&self, phone: &str, code: String, ttl: Duration) {
        self.codes.insert(
            phone.to_string(),
            StoredCode {
                code,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn verify_and_consume(&self, phone: &str, code: &str) -> Result<(), CodeError> {
        let entry = self.codes.get(phone).ok_or(CodeError::NotRequested)?;

        if entry.code != code {
            return Err(CodeError::Mismatch);
        }

        let expired = Instant::now() > entry.expires_at;
        drop(entry);
        self.codes.remove(phone);

        if expired {
            return Err(CodeError::Expired);
        }
        Ok(())
    }
}

/// Generate a random 6-digit verification code.
pub fn generate_code() -> String {
    rand::rng().random_range(100_000..1_000_000).to_string()
}
