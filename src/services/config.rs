//! Metrics API configuration

use std::time::Duration;

use crate::types::{Result, UsageError};

/// Default GitHub REST API base
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default REST API version header value
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Default HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which account the reports are requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    Enterprise,
    #[default]
    Organization,
}

impl Scope {
    /// Anything other than "enterprise" selects the organization scope
    pub fn from_setting(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("enterprise") {
            Self::Enterprise
        } else {
            Self::Organization
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Enterprise => "enterprise",
            Self::Organization => "organization",
        }
    }
}

/// Connection settings for the metrics API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub enterprise: String,
    pub organization: String,
    pub token: String,
    pub version: String,
    pub scope: Scope,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            enterprise: String::new(),
            organization: String::new(),
            token: String::new(),
            version: DEFAULT_API_VERSION.to_string(),
            scope: Scope::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Check that remote calls can be made with this configuration
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(UsageError::Config(
                "missing access token (set GITHUB_TOKEN or pass --token)".into(),
            ));
        }
        match self.scope {
            Scope::Enterprise if self.enterprise.trim().is_empty() => Err(UsageError::Config(
                "enterprise scope requires an enterprise (set GITHUB_ENTERPRISE or pass --enterprise)"
                    .into(),
            )),
            Scope::Organization if self.organization.trim().is_empty() => {
                Err(UsageError::Config(
                    "organization scope requires an organization (set GITHUB_ORGANIZATION or pass --organization)"
                        .into(),
                ))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ApiConfig {
        ApiConfig {
            organization: "octo-org".into(),
            token: "ghp_test".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_scope_from_setting() {
        assert_eq!(Scope::from_setting("enterprise"), Scope::Enterprise);
        assert_eq!(Scope::from_setting(" Enterprise "), Scope::Enterprise);
        assert_eq!(Scope::from_setting("organization"), Scope::Organization);
        assert_eq!(Scope::from_setting("org"), Scope::Organization);
        assert_eq!(Scope::from_setting(""), Scope::Organization);
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "https://api.github.com");
        assert_eq!(config.version, "2022-11-28");
        assert_eq!(config.scope, Scope::Organization);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_token() {
        let config = ApiConfig {
            token: "  ".into(),
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("access token"));
    }

    #[test]
    fn test_validate_enterprise_scope_requires_enterprise() {
        let config = ApiConfig {
            scope: Scope::Enterprise,
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(UsageError::Config(_))));

        let config = ApiConfig {
            scope: Scope::Enterprise,
            enterprise: "acme".into(),
            ..valid_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_organization_scope_requires_organization() {
        let config = ApiConfig {
            organization: String::new(),
            enterprise: "acme".into(),
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(UsageError::Config(_))));
    }
}
