//! Configuration management for glucolink.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Token replaced by the region code in the API URL template.
pub const REGION_PLACEHOLDER: &str = "COUNTRY_CODE";

/// Region sentinel that addresses the provider's root host.
pub const GLOBAL_REGION: &str = "global";

/// LibreLinkUp API URL template (can be overridden at compile time via
/// GLUCOLINK_API_URL_TEMPLATE env var).
pub const DEFAULT_API_URL_TEMPLATE: &str = match option_env!("GLUCOLINK_API_URL_TEMPLATE") {
    Some(template) => template,
    None => "https://api-COUNTRY_CODE.libreview.io/llu",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Region used for the first login attempt when nothing else is known.
pub const DEFAULT_REGION: &str = GLOBAL_REGION;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Region for the first login attempt.
    #[serde(default = "default_region")]
    pub default_region: String,
    /// API base URL template containing `-COUNTRY_CODE`.
    #[serde(default = "default_api_url_template")]
    pub api_url_template: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_api_url_template() -> String {
    DEFAULT_API_URL_TEMPLATE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            default_region: DEFAULT_REGION.to_string(),
            api_url_template: DEFAULT_API_URL_TEMPLATE.to_string(),
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from a file, falling back to defaults.
    /// Note: api_url_template is compile-time only and always uses the
    /// built-in default, regardless of what's in the config file, so a
    /// config file can never redirect credentials to another host.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.api_url_template = DEFAULT_API_URL_TEMPLATE.to_string();

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let config_path = paths.config_file();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("GLUCOLINK_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(region) = std::env::var("GLUCOLINK_REGION") {
            let region = region.trim();
            if !region.is_empty() {
                self.default_region = region.to_lowercase();
            }
        }
    }

    /// Get the global API URL (template without a region segment) as a parsed URL.
    pub fn api_url(&self) -> CoreResult<Url> {
        let placeholder = format!("-{}", REGION_PLACEHOLDER);
        if !self.api_url_template.contains(&placeholder) {
            return Err(CoreError::Config(format!(
                "API URL template must contain {}: {}",
                placeholder, self.api_url_template
            )));
        }
        Url::parse(&self.api_url_template.replacen(&placeholder, "", 1)).map_err(CoreError::from)
    }
}
