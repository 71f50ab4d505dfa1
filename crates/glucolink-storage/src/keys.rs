//! Storage key constants.

/// Keys used in the secure credential store
pub struct StorageKeys;

impl StorageKeys {
    /// LibreLinkUp auth ticket token
    pub const API_TOKEN: &'static str = "api-token";

    /// Account email used to log in
    pub const USERNAME: &'static str = "username";

    /// Account password
    pub const PASSWORD: &'static str = "password";

    /// Session metadata (JSON): account id, region, login time
    pub const SESSION_META: &'static str = "session-meta";

    /// Every key this crate writes.
    pub const ALL: [&'static str; 4] = [
        Self::API_TOKEN,
        Self::USERNAME,
        Self::PASSWORD,
        Self::SESSION_META,
    ];
}
