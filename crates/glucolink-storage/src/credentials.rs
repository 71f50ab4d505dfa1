//! High-level API for the secure credential store.

use crate::{SecureStorage, StorageError, StorageKeys, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stored login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Non-secret facts about the stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    /// Provider account identifier (plaintext, hashed only on the wire)
    pub account_id: String,
    /// Region confirmed by the provider at login
    pub region: String,
    /// When the session was established
    pub logged_in_at: DateTime<Utc>,
}

/// Credential store bound to one service namespace.
///
/// Cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn SecureStorage>,
}

impl CredentialStore {
    /// Create a credential store over the given backend
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    // ==========================================
    // Raw key access
    // ==========================================

    /// Store a value under `key`.
    pub fn store(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage.set(key, value)
    }

    /// Retrieve the value under `key`. Absence is `StorageError::NotFound`.
    pub fn get(&self, key: &str) -> StorageResult<String> {
        self.storage
            .get(key)?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    /// Delete the value under `key`. Absence is `StorageError::NotFound`.
    pub fn delete(&self, key: &str) -> StorageResult<()> {
        if self.storage.delete(key)? {
            Ok(())
        } else {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    // ==========================================
    // API token
    // ==========================================

    pub fn store_api_token(&self, token: &str) -> StorageResult<()> {
        self.store(StorageKeys::API_TOKEN, token)
    }

    /// Retrieve the API token; `None` when absent or unreadable.
    pub fn get_api_token(&self) -> Option<String> {
        match self.get(StorageKeys::API_TOKEN) {
            Ok(token) => Some(token),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(error = %e, "Failed to read API token");
                None
            }
        }
    }

    pub fn delete_api_token(&self) -> StorageResult<()> {
        match self.delete(StorageKeys::API_TOKEN) {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    }

    // ==========================================
    // Login credentials
    // ==========================================

    /// Store username and password.
    pub fn store_credentials(&self, username: &str, password: &str) -> StorageResult<()> {
        self.store(StorageKeys::USERNAME, username)?;
        self.store(StorageKeys::PASSWORD, password)?;
        debug!("Stored login credentials");
        Ok(())
    }

    /// Retrieve stored credentials; `None` if either half is missing or unreadable.
    pub fn get_credentials(&self) -> Option<Credentials> {
        let username = self.get(StorageKeys::USERNAME);
        let password = self.get(StorageKeys::PASSWORD);

        match (username, password) {
            (Ok(username), Ok(password)) => Some(Credentials { username, password }),
            (Err(e), _) | (_, Err(e)) => {
                if !e.is_not_found() {
                    warn!(error = %e, "Failed to read stored credentials");
                }
                None
            }
        }
    }

    /// Delete stored credentials. Failures are logged and ignored.
    pub fn delete_credentials(&self) {
        for key in [StorageKeys::USERNAME, StorageKeys::PASSWORD] {
            match self.delete(key) {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => debug!(key = %key, error = %e, "Ignoring credential delete failure"),
            }
        }
    }

    // ==========================================
    // Session metadata
    // ==========================================

    pub fn store_session_meta(&self, meta: &SessionMeta) -> StorageResult<()> {
        let json = serde_json::to_string(meta)?;
        self.store(StorageKeys::SESSION_META, &json)
    }

    /// Retrieve session metadata, `Ok(None)` when absent.
    pub fn get_session_meta(&self) -> StorageResult<Option<SessionMeta>> {
        match self.storage.get(StorageKeys::SESSION_META)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Delete every key in `keys`, absent ones included.
    ///
    /// Every key is attempted; the first backend failure is returned.
    fn delete_keys(&self, keys: &[&str]) -> StorageResult<()> {
        let mut first_error = None;
        for key in keys {
            if let Err(e) = self.storage.delete(key) {
                warn!(key = %key, error = %e, "Failed to delete stored value");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Remove the token and session metadata, keeping login credentials.
    pub fn clear_session(&self) -> StorageResult<()> {
        self.delete_keys(&[StorageKeys::API_TOKEN, StorageKeys::SESSION_META])
    }

    /// Remove everything this store has written.
    pub fn clear_all(&self) -> StorageResult<()> {
        self.delete_keys(&StorageKeys::ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    /// Backend whose reads and deletes always fail.
    struct BrokenStorage;

    impl SecureStorage for BrokenStorage {
        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Platform("keyring locked".to_string()))
        }

        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Platform("keyring locked".to_string()))
        }

        fn delete(&self, _key: &str) -> StorageResult<bool> {
            Err(StorageError::Platform("keyring locked".to_string()))
        }
    }

    /// Backend that reads and writes but refuses to delete.
    #[derive(Default)]
    struct NoDeleteStorage {
        inner: MemoryStorage,
    }

    impl SecureStorage for NoDeleteStorage {
        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.inner.set(key, value)
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn delete(&self, _key: &str) -> StorageResult<bool> {
            Err(StorageError::Platform("locked".to_string()))
        }
    }

    fn memory_store() -> (Arc<MemoryStorage>, CredentialStore) {
        let backend = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(backend.clone());
        (backend, store)
    }

    #[test]
    fn test_store_get_delete() {
        let (_, store) = memory_store();

        store.store("api-token", "tok").unwrap();
        assert_eq!(store.get("api-token").unwrap(), "tok");

        store.delete("api-token").unwrap();
        let err = store.get("api-token").unwrap_err();
        assert!(err.is_not_found());
        assert!(store.delete("api-token").unwrap_err().is_not_found());
    }

    #[test]
    fn test_api_token_helpers() {
        let (backend, store) = memory_store();

        assert_eq!(store.get_api_token(), None);
        store.store_api_token("ticket").unwrap();
        assert_eq!(backend.get(StorageKeys::API_TOKEN).unwrap(), Some("ticket".to_string()));
        assert_eq!(store.get_api_token(), Some("ticket".to_string()));

        store.delete_api_token().unwrap();
        store.delete_api_token().unwrap();
        assert_eq!(store.get_api_token(), None);
    }

    #[test]
    fn test_credentials_roundtrip() {
        let (_, store) = memory_store();

        assert!(store.get_credentials().is_none());

        store.store_credentials("a@b.c", "hunter2").unwrap();
        let creds = store.get_credentials().unwrap();
        assert_eq!(creds.username, "a@b.c");
        assert_eq!(creds.password, "hunter2");

        store.delete_credentials();
        assert!(store.get_credentials().is_none());
    }

    #[test]
    fn test_credentials_missing_half_is_none() {
        let (backend, store) = memory_store();
        backend.set(StorageKeys::USERNAME, "a@b.c").unwrap();

        assert!(store.get_credentials().is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "a@b.c".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("a@b.c"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_broken_backend_degrades_gracefully() {
        let store = CredentialStore::new(Arc::new(BrokenStorage));

        assert!(store.get_credentials().is_none());
        assert!(store.get_api_token().is_none());
        store.delete_credentials();
        assert!(store.clear_all().is_err());

        let err = store.get("api-token").unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_session_meta_roundtrip() {
        let (_, store) = memory_store();
        assert!(store.get_session_meta().unwrap().is_none());

        let meta = SessionMeta {
            account_id: "acct-1".to_string(),
            region: "eu".to_string(),
            logged_in_at: Utc::now(),
        };
        store.store_session_meta(&meta).unwrap();

        assert_eq!(store.get_session_meta().unwrap(), Some(meta));
    }

    #[test]
    fn test_corrupt_session_meta_is_json_error() {
        let (backend, store) = memory_store();
        backend.set(StorageKeys::SESSION_META, "{not json").unwrap();

        assert!(matches!(store.get_session_meta(), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_clear_session_keeps_credentials() {
        let (_, store) = memory_store();
        store.store_api_token("ticket").unwrap();
        store.store_credentials("a@b.c", "pw").unwrap();

        store.clear_session().unwrap();

        assert!(store.get_api_token().is_none());
        assert!(store.get_credentials().is_some());
    }

    #[test]
    fn test_clear_session_when_nothing_stored() {
        let (_, store) = memory_store();
        store.clear_session().unwrap();
        store.clear_all().unwrap();
    }

    #[test]
    fn test_clear_session_reports_delete_failure() {
        let store = CredentialStore::new(Arc::new(NoDeleteStorage::default()));
        store.store_api_token("ticket").unwrap();

        let err = store.clear_session().unwrap_err();
        assert!(matches!(err, StorageError::Platform(_)));
        assert_eq!(store.get_api_token(), Some("ticket".to_string()));
    }

    #[test]
    fn test_clear_all() {
        let (backend, store) = memory_store();
        store.store_api_token("ticket").unwrap();
        store.store_credentials("a@b.c", "pw").unwrap();
        store
            .store_session_meta(&SessionMeta {
                account_id: "acct".to_string(),
                region: "us".to_string(),
                logged_in_at: Utc::now(),
            })
            .unwrap();

        store.clear_all().unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn test_clones_share_backend() {
        let (_, store) = memory_store();
        let other = store.clone();

        store.store_api_token("shared").unwrap();
        assert_eq!(other.get_api_token(), Some("shared".to_string()));
    }
}
