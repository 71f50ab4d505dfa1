//! Windows Credential Vault implementation.

use crate::{SecureStorage, StorageError, StorageResult};
use tracing::debug;
use windows::{
    core::HSTRING,
    Security::Credentials::{PasswordCredential, PasswordVault},
};

/// HRESULT for `ERROR_NOT_FOUND`.
const ERROR_NOT_FOUND: u32 = 0x8007_0490;

/// Credential Vault based secure storage for Windows.
///
/// The vault resource is the service name and the user name is the key.
pub struct CredentialStorage {
    resource_name: String,
}

fn vault_error(context: &str, error: windows::core::Error) -> StorageError {
    StorageError::Platform(format!("{}: {}", context, error))
}

fn is_not_found(error: &windows::core::Error) -> bool {
    error.code().0 as u32 == ERROR_NOT_FOUND
}

impl CredentialStorage {
    pub fn new(service_name: &str) -> StorageResult<Self> {
        PasswordVault::new().map_err(|e| vault_error("Failed to access Credential Vault", e))?;

        Ok(Self {
            resource_name: service_name.to_string(),
        })
    }

    fn vault(&self) -> StorageResult<PasswordVault> {
        PasswordVault::new().map_err(|e| vault_error("Failed to access Credential Vault", e))
    }

    /// Look up the credential for `key`, `None` when the vault has no entry.
    fn retrieve(&self, vault: &PasswordVault, key: &str) -> StorageResult<Option<PasswordCredential>> {
        let resource = HSTRING::from(&self.resource_name);
        let user_name = HSTRING::from(key);

        match vault.Retrieve(&resource, &user_name) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(vault_error("Failed to retrieve credential", e)),
        }
    }
}

impl SecureStorage for CredentialStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        debug!(resource = %self.resource_name, key = %key, "Setting credential");

        let vault = self.vault()?;
        if let Some(existing) = self.retrieve(&vault, key)? {
            vault
                .Remove(&existing)
                .map_err(|e| vault_error("Failed to replace credential", e))?;
        }

        let credential = PasswordCredential::CreatePasswordCredential(
            &HSTRING::from(&self.resource_name),
            &HSTRING::from(key),
            &HSTRING::from(value),
        )
        .map_err(|e| vault_error("Failed to create credential", e))?;

        vault
            .Add(&credential)
            .map_err(|e| vault_error("Failed to add credential", e))
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        debug!(resource = %self.resource_name, key = %key, "Getting credential");

        let vault = self.vault()?;
        let Some(credential) = self.retrieve(&vault, key)? else {
            return Ok(None);
        };

        // Password is only populated after RetrievePassword
        credential
            .RetrievePassword()
            .map_err(|e| vault_error("Failed to retrieve password", e))?;
        let password = credential
            .Password()
            .map_err(|e| vault_error("Failed to read password", e))?;

        Ok(Some(password.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        debug!(resource = %self.resource_name, key = %key, "Deleting credential");

        let vault = self.vault()?;
        match self.retrieve(&vault, key)? {
            Some(credential) => {
                vault
                    .Remove(&credential)
                    .map_err(|e| vault_error("Failed to remove credential", e))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_RESOURCE: &str = "com.glucolink.app.test";

    #[test]
    #[ignore] // Requires Windows Credential Vault access
    fn test_credential_operations() {
        let storage = CredentialStorage::new(TEST_RESOURCE).unwrap();
        let _ = storage.delete("test_key");

        storage.set("test_key", "test_value").unwrap();
        assert_eq!(storage.get("test_key").unwrap(), Some("test_value".to_string()));

        storage.set("test_key", "new_value").unwrap();
        assert_eq!(storage.get("test_key").unwrap(), Some("new_value".to_string()));

        assert!(storage.has("test_key").unwrap());
        assert!(storage.delete("test_key").unwrap());
        assert!(!storage.delete("test_key").unwrap());
        assert_eq!(storage.get("test_key").unwrap(), None);
    }
}
