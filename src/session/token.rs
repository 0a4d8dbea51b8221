use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{read_optional, remove_file, write_file, StoreError, SESSION_FILE};

/// Backend session token with its local expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The terminal's cookie jar: one token, one expiry.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    max_age: Duration,
}

impl SessionStore {
    pub fn new(state_dir: &Path, max_age_days: i64) -> Self {
        Self {
            path: state_dir.join(SESSION_FILE),
            max_age: Duration::days(max_age_days),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a freshly issued token, expiring `max_age` from `now`
    pub fn store(&self, token: &str, now: DateTime<Utc>) -> Result<StoredSession, StoreError> {
        let session = StoredSession {
            token: token.to_string(),
            expires_at: now + self.max_age,
        };
        let json = serde_json::to_string_pretty(&session)
            .map_err(|e| StoreError::corrupt(&self.path, e))?;
        write_file(&self.path, &json)?;
        debug!(expires_at = %session.expires_at, "Stored session token");
        Ok(session)
    }

    /// Current token, or `None` when absent or expired
    pub fn token(&self) -> Result<Option<String>, StoreError> {
        self.token_at(Utc::now())
    }

    pub fn token_at(&self, now: DateTime<Utc>) -> Result<Option<String>, StoreError> {
        let Some(contents) = read_optional(&self.path)? else {
            return Ok(None);
        };
        let session: StoredSession =
            serde_json::from_str(&contents).map_err(|e| StoreError::corrupt(&self.path, e))?;

        if session.is_expired(now) {
            debug!("Stored session expired");
            return Ok(None);
        }
        Ok(Some(session.token))
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        remove_file(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_means_no_token() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path(), 7);
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn test_store_then_read() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path(), 7);
        let now = Utc::now();

        let session = store.store("tok-123", now).unwrap();
        assert_eq!(session.expires_at, now + Duration::days(7));
        assert_eq!(store.token_at(now).unwrap().as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_expired_token_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path(), 7);
        let now = Utc::now();
        store.store("tok-123", now).unwrap();

        let later = now + Duration::days(7);
        assert_eq!(store.token_at(later).unwrap(), None);
        assert_eq!(
            store.token_at(later - Duration::seconds(1)).unwrap().as_deref(),
            Some("tok-123")
        );
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path(), 7);
        store.store("tok", Utc::now()).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path(), 7);
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.token(), Err(StoreError::Corrupt { .. })));
    }
}
