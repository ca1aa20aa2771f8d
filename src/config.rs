//! Collection configuration
//!
//! A collection can be described in YAML or JSON:
//!
//! ```yaml
//! base_url: https://api.example.com
//! path: /api/trips
//! items_path: trips
//! params:
//!   limit: 2
//!   ownerId: 1
//! pagination:
//!   default_limit: 10
//!   total_count_path: totalCount
//! mixins:
//!   paginate: true
//!   query_string: true
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::http::HttpTransportConfig;
use crate::pagination::PaginationConfig;
use crate::types::RequestParams;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Collection Config
// ============================================================================

/// Complete collection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Base URL for API requests
    #[serde(default)]
    pub base_url: Option<String>,

    /// Collection path, relative to the base URL
    pub path: String,

    /// Dotted path to the records array in the response body.
    /// Unset means the body itself is the array.
    #[serde(default)]
    pub items_path: Option<String>,

    /// Initial resident parameters
    #[serde(default)]
    pub params: RequestParams,

    /// Page tracker settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Which mixins to attach
    #[serde(default)]
    pub mixins: MixinSelection,

    /// HTTP settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl CollectionConfig {
    /// Create a config for `path` with defaults everywhere else
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            base_url: None,
            path: path.into(),
            items_path: None,
            params: RequestParams::default(),
            pagination: PaginationConfig::default(),
            mixins: MixinSelection::default(),
            http: HttpConfig::default(),
        }
    }

    /// Parse a YAML document (JSON is valid YAML too)
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::invalid_value("path", "must not be empty"));
        }
        if self.pagination.default_limit == 0 {
            return Err(Error::invalid_value(
                "pagination.default_limit",
                "must be at least 1",
            ));
        }
        if self.pagination.total_count_path.trim().is_empty() {
            return Err(Error::invalid_value(
                "pagination.total_count_path",
                "must not be empty",
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::invalid_value("http.timeout_secs", "must be at least 1"));
        }
        Ok(())
    }

    /// Transport settings derived from this config
    pub fn transport_config(&self) -> HttpTransportConfig {
        let mut builder = HttpTransportConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_secs));
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url);
        }
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent);
        }
        for (key, value) in &self.http.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }
}

// ============================================================================
// Mixins
// ============================================================================

/// Mixins attached when a collection is built from config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixinSelection {
    /// Attach the page tracker
    #[serde(default = "default_true")]
    pub paginate: bool,

    /// Attach the query string synchronizer
    #[serde(default)]
    pub query_string: bool,
}

impl Default for MixinSelection {
    fn default() -> Self {
        Self {
            paginate: true,
            query_string: false,
        }
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Override the user agent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
            headers: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const YAML: &str = r"
base_url: https://api.example.com
path: /api/trips
items_path: trips
params:
  limit: 2
  ownerId: 1
pagination:
  default_limit: 25
mixins:
  query_string: true
http:
  timeout_secs: 5
  headers:
    Authorization: Bearer abc
";

    #[test]
    fn test_parse_yaml() {
        let config = CollectionConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.items_path.as_deref(), Some("trips"));
        assert_eq!(config.params.limit, Some(2));
        assert_eq!(config.params.filters.get("ownerId"), Some(&serde_json::json!(1)));
        assert_eq!(config.pagination.default_limit, 25);
        assert_eq!(config.pagination.total_count_path, "totalCount");
        assert!(config.mixins.paginate);
        assert!(config.mixins.query_string);
    }

    #[test]
    fn test_defaults() {
        let config = CollectionConfig::from_yaml_str("path: /items").unwrap();
        assert_eq!(config, CollectionConfig::new("/items"));
        assert!(config.mixins.paginate);
        assert!(!config.mixins.query_string);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_validation() {
        let err = CollectionConfig::from_yaml_str("path: ''").unwrap_err();
        assert!(err.to_string().contains("path"));

        let err = CollectionConfig::from_yaml_str("path: /x\npagination:\n  default_limit: 0")
            .unwrap_err();
        assert!(err.to_string().contains("default_limit"));
    }

    #[test]
    fn test_transport_config() {
        let config = CollectionConfig::from_yaml_str(YAML).unwrap();
        let transport = config.transport_config();
        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert_eq!(transport.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(
            transport.default_headers.get("Authorization"),
            Some(&"Bearer abc".to_string())
        );
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"path": "/api/trips", "params": {{"page": 2}}}}"#).unwrap();

        let config = CollectionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.path, "/api/trips");
        assert_eq!(config.params.page, Some(2));
    }

    #[test]
    fn test_missing_file() {
        let err = CollectionConfig::from_file("/nonexistent/collection.yaml").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to read config file '/nonexistent/collection.yaml'"));
        assert!(message.contains("IO error"));
    }
}
