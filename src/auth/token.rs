//! Persisted bearer-token store.
//!
//! Holds the token and its expiry instant, surviving restarts within one
//! profile. Pure data access: no validation of token contents, no network.
//! The store is the single writer of session state - the session service
//! populates it on login and everything else only reads or clears it.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Wall-clock source, injectable for tests with simulated time
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    /// Absent when the token's lifetime is only carried in its own payload
    pub expires_at_ms: Option<i64>,
}

/// Persisted token record behind a single-writer interface.
///
/// No operation returns an error or panics: absence is represented as
/// `None`, and filesystem failures are logged and otherwise ignored - the
/// in-memory record stays authoritative for the process lifetime.
pub struct TokenStore {
    dir: PathBuf,
    record: Mutex<Option<TokenRecord>>,
    clock: Arc<dyn Clock>,
}

impl TokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self::with_clock(dir, Arc::new(SystemClock))
    }

    pub fn with_clock(dir: PathBuf, clock: Arc<dyn Clock>) -> Self {
        let record = Self::load_from_disk(&dir);
        Self {
            dir,
            record: Mutex::new(record),
            clock,
        }
    }

    fn load_from_disk(dir: &PathBuf) -> Option<TokenRecord> {
        let path = dir.join(SESSION_FILE);
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "discarding unparseable session file");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "failed to read session file");
                None
            }
        }
    }

    fn guard(&self) -> MutexGuard<'_, Option<TokenRecord>> {
        // A poisoned lock only means another thread panicked mid-update;
        // the record itself is still a plain value.
        self.record.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a token together with its expiry instant so a verdict is
    /// derivable later without decoding the token again.
    pub fn save(&self, token: &str, ttl_secs: i64) {
        let expires_at_ms = self.clock.now_ms() + ttl_secs * 1000;
        let mut guard = self.guard();
        *guard = Some(TokenRecord {
            token: token.to_string(),
            expires_at_ms: Some(expires_at_ms),
        });
        self.persist(&guard);
    }

    /// Store a token without an explicit expiry. The session oracle will
    /// derive one from the token payload on its first verdict.
    pub fn save_unbounded(&self, token: &str) {
        let mut guard = self.guard();
        *guard = Some(TokenRecord {
            token: token.to_string(),
            expires_at_ms: None,
        });
        self.persist(&guard);
    }

    /// Record an expiry derived from the token payload, leaving the token
    /// itself untouched. No-op when no token is stored.
    pub fn memoize_expiry(&self, expires_at_ms: i64) {
        let mut guard = self.guard();
        if let Some(record) = guard.as_mut() {
            record.expires_at_ms = Some(expires_at_ms);
            self.persist(&guard);
        }
    }

    pub fn read(&self) -> Option<TokenRecord> {
        self.guard().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.guard().as_ref().map(|r| r.token.clone())
    }

    pub fn clear(&self) {
        let mut guard = self.guard();
        *guard = None;
        let path = self.dir.join(SESSION_FILE);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(error = %e, "failed to remove session file");
            }
        }
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    fn persist(&self, guard: &Option<TokenRecord>) {
        let Some(record) = guard.as_ref() else {
            return;
        };
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(error = %e, "failed to create session directory");
            return;
        }
        let path = self.dir.join(SESSION_FILE);
        match serde_json::to_string_pretty(record) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(&path, contents) {
                    warn!(error = %e, "failed to write session file");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize session record"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_clock::ManualClock;
    use super::*;

    #[test]
    fn save_records_token_and_derived_expiry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = TokenStore::with_clock(dir.path().to_path_buf(), clock);

        store.save("abc.def.ghi", 3600);

        let record = store.read().expect("record present");
        assert_eq!(record.token, "abc.def.ghi");
        assert_eq!(record.expires_at_ms, Some(1_000_000 + 3600 * 1000));
    }

    #[test]
    fn record_survives_a_new_store_on_the_same_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = TokenStore::new(dir.path().to_path_buf());
            store.save("persisted-token", 60);
        }

        let reopened = TokenStore::new(dir.path().to_path_buf());
        let record = reopened.read().expect("record survives restart");
        assert_eq!(record.token, "persisted-token");
        assert!(record.expires_at_ms.is_some());
    }

    #[test]
    fn clear_removes_record_and_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path().to_path_buf());
        store.save("abc", 60);

        store.clear();

        assert!(store.read().is_none());
        let reopened = TokenStore::new(dir.path().to_path_buf());
        assert!(reopened.read().is_none());
    }

    #[test]
    fn save_unbounded_has_no_expiry_until_memoized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path().to_path_buf());

        store.save_unbounded("abc");
        assert_eq!(store.read().expect("record").expires_at_ms, None);

        store.memoize_expiry(42_000);
        assert_eq!(store.read().expect("record").expires_at_ms, Some(42_000));
    }

    #[test]
    fn memoize_expiry_without_token_is_a_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path().to_path_buf());

        store.memoize_expiry(42_000);
        assert!(store.read().is_none());
    }
}
