//! Provider connection settings.

/// Environment variable overriding the API root.
pub const API_ROOT_URL_ENV: &str = "BITRISE_API_ROOT_URL";

pub const DEFAULT_API_ROOT_URL: &str = "https://api.bitrise.io";

pub const API_VERSION: &str = "v0.1";

/// Where and how to reach the build provider's API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_root_url: String,
    pub api_version: String,
    /// Sent as `Bitrise-Addon-Auth-Token`.
    pub auth_token: String,
}

impl ProviderConfig {
    pub fn new(api_root_url: &str, auth_token: &str) -> Self {
        ProviderConfig {
            api_root_url: api_root_url.to_string(),
            api_version: API_VERSION.to_string(),
            auth_token: auth_token.to_string(),
        }
    }

    /// Read the API root from the process environment.
    pub fn from_env(auth_token: &str) -> Self {
        Self::from_lookup(auth_token, |key| std::env::var(key).ok())
    }

    /// Read the API root through `lookup`; unset or blank falls back to the
    /// public endpoint.
    pub fn from_lookup<F>(auth_token: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = lookup(API_ROOT_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_ROOT_URL.to_string());
        Self::new(&root, auth_token)
    }

    /// `<root>/<version>` without a trailing slash.
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_root_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_root() {
        let config = ProviderConfig::from_lookup("tok", |_| None);
        assert_eq!(config.base_url(), "https://api.bitrise.io/v0.1");
        assert_eq!(config.auth_token, "tok");
    }

    #[test]
    fn test_root_override() {
        let config = ProviderConfig::from_lookup("tok", |key| {
            (key == API_ROOT_URL_ENV).then(|| "http://localhost:8080/".to_string())
        });
        assert_eq!(config.base_url(), "http://localhost:8080/v0.1");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let config = ProviderConfig::from_lookup("tok", |_| Some("  ".to_string()));
        assert_eq!(config.api_root_url, DEFAULT_API_ROOT_URL);
    }
}
