//! Back office configuration.

use std::path::Path;

use crate::access::roles::{builtin_roles, RoleDefinition};
use crate::error::BackofficeError;

pub const DEFAULT_APP_LABEL: &str = "core";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BackofficeConfig {
    /// Rows per page on paginated listings.
    pub page_size: usize,
    /// Accepted as a prefix on qualified permission names (`core.view_client`).
    pub app_label: String,
    /// Roles installed by [`crate::access::roles::bootstrap_roles`].
    pub roles: Vec<RoleDefinition>,
}

impl Default for BackofficeConfig {
    fn default() -> Self {
        BackofficeConfig {
            page_size: 10,
            app_label: DEFAULT_APP_LABEL.to_string(),
            roles: builtin_roles(),
        }
    }
}

impl BackofficeConfig {
    pub fn from_json(json: &str) -> Result<Self, BackofficeError> {
        let config: BackofficeConfig =
            serde_json::from_str(json).map_err(|e| BackofficeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BackofficeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), BackofficeError> {
        if self.page_size == 0 {
            return Err(BackofficeError::InvalidConfig("page_size must be at least 1".into()));
        }
        if self.app_label.trim().is_empty() {
            return Err(BackofficeError::InvalidConfig("app_label must not be empty".into()));
        }
        Ok(())
    }
}
