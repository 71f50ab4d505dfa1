//! CLI command implementations.

mod auth;
mod glucose;
mod prefs;

pub use auth::{login, logout, status};
pub use glucose::{connection, glucose};
pub use prefs::{prefs_clear, prefs_delete, prefs_get, prefs_list, prefs_set};

use crate::output::OutputFormat;
use anyhow::{Context as _, Result};
use glucolink_auth::{LinkUpClient, SessionManager};
use glucolink_config_and_utils::{Config, Paths};
use glucolink_storage::PreferenceStore;

/// Preference key remembering the region of the last successful login.
pub const LAST_REGION_PREF: &str = "last_region";

/// Everything a command needs, built once at startup.
pub struct Context {
    pub paths: Paths,
    pub config: Config,
    pub format: OutputFormat,
}

impl Context {
    /// Build the session manager over the platform credential store.
    pub fn session_manager(&self) -> Result<SessionManager> {
        let credentials = glucolink_storage::create_credential_store()
            .context("Secure credential storage is unavailable")?;
        let client = LinkUpClient::from_config(&self.config)?;
        Ok(SessionManager::new(
            client,
            credentials,
            &self.config.default_region,
        ))
    }

    pub fn preferences(&self) -> Result<PreferenceStore> {
        Ok(PreferenceStore::load(self.paths.preferences_file())?)
    }
}
