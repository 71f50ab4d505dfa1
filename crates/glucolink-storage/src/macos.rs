//! macOS Keychain implementation.

use crate::{SecureStorage, StorageError, StorageResult};
use security_framework::base::Error as KeychainError;
use security_framework::passwords::{
    delete_generic_password, get_generic_password, set_generic_password,
};
use tracing::debug;

/// `errSecItemNotFound`
const ERR_SEC_ITEM_NOT_FOUND: i32 = -25300;

/// Keychain-based secure storage for macOS.
///
/// Every entry is a generic password item with `service = service_name`
/// and `account = key`.
pub struct KeychainStorage {
    service_name: String,
}

impl KeychainStorage {
    pub fn new(service_name: &str) -> StorageResult<Self> {
        Ok(Self {
            service_name: service_name.to_string(),
        })
    }
}

fn is_item_not_found(error: &KeychainError) -> bool {
    error.code() == ERR_SEC_ITEM_NOT_FOUND
}

fn keychain_error(action: &str, error: KeychainError) -> StorageError {
    StorageError::Platform(format!("Failed to {} keychain item: {}", action, error))
}

impl SecureStorage for KeychainStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        debug!(service = %self.service_name, key = %key, "Setting keychain item");

        set_generic_password(&self.service_name, key, value.as_bytes())
            .map_err(|e| keychain_error("set", e))
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        debug!(service = %self.service_name, key = %key, "Getting keychain item");

        match get_generic_password(&self.service_name, key) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StorageError::Encoding(e.to_string())),
            Err(e) if is_item_not_found(&e) => Ok(None),
            Err(e) => Err(keychain_error("get", e)),
        }
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        debug!(service = %self.service_name, key = %key, "Deleting keychain item");

        match delete_generic_password(&self.service_name, key) {
            Ok(()) => Ok(true),
            Err(e) if is_item_not_found(&e) => Ok(false),
            Err(e) => Err(keychain_error("delete", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CredentialStore;
    use std::sync::Arc;

    const TEST_SERVICE: &str = "com.glucolink.app.test";

    #[test]
    #[ignore] // Requires macOS Keychain access
    fn test_keychain_operations() {
        let storage = KeychainStorage::new(TEST_SERVICE).unwrap();
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
    #[ignore] // Requires macOS Keychain access
    fn test_credential_store_on_keychain() {
        let store = CredentialStore::new(Arc::new(KeychainStorage::new(TEST_SERVICE).unwrap()));
        store.clear_all().unwrap();

        store.store_credentials("test@example.com", "pw").unwrap();
        assert_eq!(store.get_credentials().unwrap().username, "test@example.com");

        store.clear_all().unwrap();
        assert!(store.get_credentials().is_none());
    }
}
