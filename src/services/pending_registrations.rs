use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OtpError {
    #[error("No pending registration for this email")]
    NotFound,
    #[error("OTP has expired")]
    Expired,
    #[error("OTP does not match")]
    Mismatch,
}

/// One registration awaiting verification. The submitted password is held
/// as-is for the verification window; it is only hashed once the OTP check
/// passes and a user row is about to be written.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub password: String,
    pub otp: String,
    pub issued_at: DateTime<Utc>,
}

/// Process-wide map of email to pending registration.
///
/// Entries are removed when claimed or when a claim attempt detects expiry;
/// abandoned entries stay until a re-registration overwrites them. All
/// methods take the lock for the whole check, so `claim` is atomic per key:
/// of several concurrent verifications for one email, at most one wins.
pub struct PendingRegistrationStore {
    entries: Mutex<HashMap<String, PendingRegistration>>,
    ttl: Duration,
}

impl PendingRegistrationStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, PendingRegistration>> {
        // A poisoned lock only means a panic elsewhere; the map itself is
        // always consistent, so keep serving it.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a pending registration, replacing any existing entry for the
    /// email. Replacement silently invalidates the previously issued OTP.
    pub fn put(&self, email: &str, password: &str, otp: &str) {
        self.put_at(email, password, otp, Utc::now());
    }

    /// [`put`](Self::put) with an explicit issuance time.
    pub fn put_at(&self, email: &str, password: &str, otp: &str, issued_at: DateTime<Utc>) {
        self.entries().insert(
            email.to_string(),
            PendingRegistration {
                password: password.to_string(),
                otp: otp.to_string(),
                issued_at,
            },
        );
    }

    pub fn get(&self, email: &str) -> Option<PendingRegistration> {
        self.entries().get(email).cloned()
    }

    pub fn remove(&self, email: &str) {
        self.entries().remove(email);
    }

    /// Verifies the submitted OTP and consumes the entry on success,
    /// returning the stored password. A mismatch leaves the entry in place
    /// so the client may retry; expiry removes it.
    pub fn claim(&self, email: &str, otp: &str) -> Result<String, OtpError> {
        self.claim_at(email, otp, Utc::now())
    }

    /// [`claim`](Self::claim) with an explicit notion of "now".
    pub fn claim_at(&self, email: &str, otp: &str, now: DateTime<Utc>) -> Result<String, OtpError> {
        let mut entries = self.entries();

        let entry = match entries.remove(email) {
            Some(entry) => entry,
            None => return Err(OtpError::NotFound),
        };

        if now - entry.issued_at > self.ttl {
            return Err(OtpError::Expired);
        }

        if entry.otp != otp {
            // Put it back untouched; retries keep the original expiry.
            entries.insert(email.to_string(), entry);
            return Err(OtpError::Mismatch);
        }

        Ok(entry.password)
    }
}
