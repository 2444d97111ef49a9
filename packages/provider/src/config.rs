/**
 * Provider configuration
 */
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::extractor::DEFAULT_BINDING_ATTRIBUTE;
use crate::virtual_elements::{CommentDirectiveLocator, DEFAULT_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Attribute carrying annotations on element nodes
    pub binding_attribute: String,
    /// Word introducing a binding inside a comment node
    pub virtual_element_prefix: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            binding_attribute: DEFAULT_BINDING_ATTRIBUTE.to_string(),
            virtual_element_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ProviderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let attribute = &self.binding_attribute;
        if attribute.is_empty() || attribute.chars().any(|c| c.is_whitespace() || c == '=') {
            return Err(ConfigError::Invalid {
                field: "binding_attribute",
                reason: format!("'{}' is not a valid attribute name", attribute),
            });
        }
        self.locator().map(|_| ())
    }

    /// Comment locator for the configured prefix
    pub fn locator(&self) -> Result<CommentDirectiveLocator, ConfigError> {
        CommentDirectiveLocator::with_prefix(&self.virtual_element_prefix)
    }
}
