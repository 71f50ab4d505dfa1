//! Account identifier hashing for the `Account-Id` header.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the UTF-8 bytes of `account_id`.
pub fn account_id_digest(account_id: &str) -> String {
    hex::encode(Sha256::digest(account_id.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic_fixed_length_hex() {
        let a = account_id_digest("f3b1c8e2-7a4d-4c1e-9b2f-1d2e3f4a5b6c");
        let b = account_id_digest("f3b1c8e2-7a4d-4c1e-9b2f-1d2e3f4a5b6c");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, "f3b1c8e2-7a4d-4c1e-9b2f-1d2e3f4a5b6c");
    }

    #[test]
    fn digest_matches_known_vectors() {
        assert_eq!(
            account_id_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            account_id_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_differs_per_account() {
        assert_ne!(account_id_digest("account-1"), account_id_digest("account-2"));
    }
}
