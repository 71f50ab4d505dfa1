//! Linux Secret Service implementation.

use crate::{SecureStorage, StorageError, StorageResult};
use secret_service::blocking::{Collection, SecretService};
use secret_service::EncryptionType;
use std::collections::HashMap;
use tracing::debug;

/// Attribute identifying items written by this application.
const APPLICATION_ATTRIBUTE: &str = "glucolink";

/// Secret Service based secure storage for Linux.
///
/// Items live in the default collection and are looked up by the
/// `(application, service, key)` attribute triple.
pub struct SecretServiceStorage {
    service_name: String,
}

fn platform_error(context: &str, error: impl std::fmt::Display) -> StorageError {
    StorageError::Platform(format!("{}: {}", context, error))
}

impl SecretServiceStorage {
    /// Create a new Secret Service storage instance.
    ///
    /// Fails early when no Secret Service daemon is reachable over D-Bus.
    pub fn new(service_name: &str) -> StorageResult<Self> {
        SecretService::connect(EncryptionType::Dh)
            .map_err(|e| platform_error("Failed to connect to Secret Service", e))?;

        Ok(Self {
            service_name: service_name.to_string(),
        })
    }

    fn with_collection<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Collection) -> StorageResult<T>,
    {
        let ss = SecretService::connect(EncryptionType::Dh)
            .map_err(|e| platform_error("Failed to connect to Secret Service", e))?;

        let collection = ss
            .get_default_collection()
            .map_err(|e| platform_error("No default collection", e))?;

        if collection.is_locked().unwrap_or(false) {
            collection
                .unlock()
                .map_err(|e| platform_error("Failed to unlock collection", e))?;
        }

        f(&collection)
    }

    fn attributes<'a>(&'a self, key: &'a str) -> HashMap<&'a str, &'a str> {
        HashMap::from([
            ("application", APPLICATION_ATTRIBUTE),
            ("service", self.service_name.as_str()),
            ("key", key),
        ])
    }
}

impl SecureStorage for SecretServiceStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        debug!(service = %self.service_name, key = %key, "Setting secret");

        self.with_collection(|collection| {
            let label = format!("Glucolink: {}", key);
            collection
                .create_item(&label, self.attributes(key), value.as_bytes(), true, "text/plain")
                .map_err(|e| platform_error("Failed to store secret", e))?;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        debug!(service = %self.service_name, key = %key, "Getting secret");

        self.with_collection(|collection| {
            let items = collection
                .search_items(self.attributes(key))
                .map_err(|e| platform_error("Failed to search secrets", e))?;

            let Some(item) = items.first() else {
                return Ok(None);
            };

            let secret = item
                .get_secret()
                .map_err(|e| platform_error("Failed to read secret", e))?;

            String::from_utf8(secret)
                .map(Some)
                .map_err(|e| StorageError::Encoding(e.to_string()))
        })
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        debug!(service = %self.service_name, key = %key, "Deleting secret");

        self.with_collection(|collection| {
            let items = collection
                .search_items(self.attributes(key))
                .map_err(|e| platform_error("Failed to search secrets", e))?;

            if items.is_empty() {
                return Ok(false);
            }

            for item in &items {
                item.delete()
                    .map_err(|e| platform_error("Failed to delete secret", e))?;
            }
            Ok(true)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CredentialStore;
    use std::sync::Arc;

    const TEST_SERVICE: &str = "com.glucolink.app.test";

    #[test]
    #[ignore] // Requires Linux Secret Service (D-Bus)
    fn test_secret_service_operations() {
        let storage = SecretServiceStorage::new(TEST_SERVICE).unwrap();
        let _ = storage.delete("test_key");

        storage.set("test_key", "test_value").unwrap();
        assert_eq!(storage.get("test_key").unwrap(), Some("test_value".to_string()));

        storage.set("test_key", "new_value").unwrap();
        assert_eq!(storage.get("test_key").unwrap(), Some("new_value".to_string()));

        assert!(storage.delete("test_key").unwrap());
        assert!(!storage.delete("test_key").unwrap());
        assert_eq!(storage.get("test_key").unwrap(), None);
    }

    #[test]
    #[ignore] // Requires Linux Secret Service (D-Bus)
    fn test_credential_store_on_secret_service() {
        let backend = SecretServiceStorage::new(TEST_SERVICE).unwrap();
        let store = CredentialStore::new(Arc::new(backend));
        store.clear_all().unwrap();

        store.store_api_token("ticket").unwrap();
        assert_eq!(store.get_api_token(), Some("ticket".to_string()));

        store.clear_all().unwrap();
        assert!(store.get_api_token().is_none());
    }
}
