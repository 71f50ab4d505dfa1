//! Region to API base URL resolution.

use crate::{AuthError, AuthResult};
use glucolink_config_and_utils::{DEFAULT_API_URL_TEMPLATE, GLOBAL_REGION, REGION_PLACEHOLDER};
use url::Url;

/// Region code the provider merged into `eu`.
const MERGED_REGION: &str = "ch";
const MERGED_INTO: &str = "eu";

/// Lowercase a provider region code and fold `ch` into `eu`.
pub fn normalize_region(code: &str) -> String {
    let lowered = code.trim().to_lowercase();
    if lowered == MERGED_REGION {
        MERGED_INTO.to_string()
    } else {
        lowered
    }
}

/// Maps a region code onto the regional API host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    template: String,
}

impl EndpointResolver {
    /// Build a resolver from a template such as
    /// `https://api-COUNTRY_CODE.libreview.io/llu`.
    ///
    /// The template must contain `-COUNTRY_CODE` and its global form must
    /// parse as a URL.
    pub fn new(template: impl Into<String>) -> AuthResult<Self> {
        let template = template.into();
        let placeholder = format!("-{}", REGION_PLACEHOLDER);
        if !template.contains(&placeholder) {
            return Err(AuthError::InvalidTemplate(format!(
                "{} does not contain {}",
                template, placeholder
            )));
        }

        let resolver = Self { template };
        Url::parse(&resolver.resolve(GLOBAL_REGION))?;
        Ok(resolver)
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Base URL for `region`. `global` drops the region segment; any other
    /// value is substituted verbatim.
    pub fn resolve(&self, region: &str) -> String {
        if region == GLOBAL_REGION {
            self.template
                .replacen(&format!("-{}", REGION_PLACEHOLDER), "", 1)
        } else {
            self.template.replacen(REGION_PLACEHOLDER, region, 1)
        }
    }

    /// `{base}/{path}` for `region`.
    pub fn url(&self, region: &str, path: &str) -> String {
        format!(
            "{}/{}",
            self.resolve(region).trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self {
            template: DEFAULT_API_URL_TEMPLATE.to_string(),
        }
    }
}
