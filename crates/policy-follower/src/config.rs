use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings shared by the catalog, the registry and its followers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Follower error category that receives violation messages (default: "base")
    pub error_category: String,
    /// Separator between namespace segments in policy paths (default: "::")
    pub namespace_separator: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            error_category: "base".to_string(),
            namespace_separator: "::".to_string(),
        }
    }
}

impl PolicyConfig {
    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn with_error_category(mut self, category: impl Into<String>) -> Self {
        self.error_category = category.into();
        self
    }

    pub fn with_namespace_separator(mut self, separator: impl Into<String>) -> Self {
        self.namespace_separator = separator.into();
        self
    }
}
