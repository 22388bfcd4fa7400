//! Bridge configuration types.
//!
//! This module defines the TOML-deserializable configuration of a bridge instance. The
//! configuration is established once at process start and never mutated afterwards.
//!
//! # Examples
//!
//! ```toml
//! base_url = "https://shop.example.com"
//! store_code = "default"
//! namespace = "m2"
//! default_currency = "EUR"
//! access_token = "integration-token"
//!
//! [http]
//! timeout_secs = 20
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::{
    error::{BridgeError, Result},
    models::CustomField,
    transport::HttpConfig,
};

/// Default REST prefix of the platform.
pub const DEFAULT_API_PREFIX: &str = "/rest/V1";

/// Default vendor namespace for custom fields.
pub const DEFAULT_NAMESPACE: &str = "m2";

/// Default ISO 4217 currency for records that carry none.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Root bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Base URL of the platform (scheme and host, optionally a path).
    pub base_url: String,

    /// REST prefix (default: `/rest/V1`).
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Store view code inserted between `/rest` and `/V1` when set.
    #[serde(default)]
    pub store_code: Option<String>,

    /// Vendor namespace prefixed to custom field names (default: `m2`).
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Currency applied to records that carry no currency of their own.
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Bearer token for the integration.
    #[serde(default)]
    pub access_token: Option<String>,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_prefix: default_api_prefix(),
            store_code: None,
            namespace: default_namespace(),
            default_currency: default_currency(),
            access_token: None,
            http: HttpConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Creates a configuration for the given base URL with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    /// Parses and validates a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing fails or configuration validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| BridgeError::ConfigError(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or [`BridgeConfig::from_toml`] fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| BridgeError::ConfigError(format!("cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Validates the configuration.
    ///
    /// This method checks that:
    /// - the base URL parses and uses `http` or `https`
    /// - the REST prefix is a safe absolute path
    /// - the store code and namespace are identifier-like
    /// - the default currency is a three-letter code
    /// - HTTP timeouts are within bounds
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] if any validation fails.
    pub fn validate(&self) -> Result<()> {
        self.validate_base_url()?;
        validate_path("api_prefix", &self.api_prefix)?;

        if let Some(ref store) = self.store_code {
            validate_identifier("store_code", store)?;
        }
        validate_identifier("namespace", &self.namespace)?;

        if self.default_currency.len() != 3
            || !self.default_currency.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(BridgeError::ConfigError(format!(
                "default_currency must be a three-letter ISO 4217 code, got: {}",
                self.default_currency
            )));
        }

        self.http.validate()
    }

    fn validate_base_url(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            BridgeError::ConfigError(format!("invalid base_url '{}': {e}", self.base_url))
        })?;

        match url.scheme() {
            "https" => Ok(()),
            "http" => {
                tracing::warn!(base_url = %self.base_url, "platform base_url is not using HTTPS");
                Ok(())
            }
            other => Err(BridgeError::ConfigError(format!(
                "base_url must use http or https, got: {other}"
            ))),
        }
    }

    /// Returns the REST root the transport prefixes to every path, e.g.
    /// `https://shop.example.com/rest/default/V1`.
    #[must_use]
    pub fn rest_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_end_matches('/');
        match self.store_code.as_deref() {
            Some(store) => match prefix.strip_prefix("/rest") {
                Some(rest) => format!("{base}/rest/{store}{rest}"),
                None => format!("{base}{prefix}"),
            },
            None => format!("{base}{prefix}"),
        }
    }

    /// Returns the custom field namespace of this configuration.
    #[must_use]
    pub fn field_namespace(&self) -> FieldNamespace {
        FieldNamespace::new(self.namespace.clone())
    }
}

/// Builds namespaced custom field names (`{namespace}_{key}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNamespace(String);

impl Default for FieldNamespace {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl FieldNamespace {
    /// Creates a namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self(namespace.into())
    }

    /// Returns the raw namespace.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the namespaced field name for `key`.
    #[must_use]
    pub fn name(&self, key: &str) -> String {
        format!("{}_{key}", self.0)
    }

    /// Builds a custom field.
    #[must_use]
    pub fn field(&self, key: &str, value: impl Into<String>) -> CustomField {
        CustomField { name: self.name(key), value: value.into() }
    }

    /// Strips this namespace from a field name, returning the bare key.
    #[must_use]
    pub fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.0.as_str())?.strip_prefix('_')
    }
}

/// Rejects traversal, doubled slashes and relative paths.
pub(crate) fn validate_path(name: &str, path: &str) -> Result<()> {
    if path.contains("..") {
        return Err(BridgeError::ConfigError(format!(
            "'{name}' contains path traversal sequence '..': {path}"
        )));
    }
    if path.contains("//") {
        return Err(BridgeError::ConfigError(format!(
            "'{name}' contains double slash '//': {path}"
        )));
    }
    if !path.starts_with('/') {
        return Err(BridgeError::ConfigError(format!("'{name}' must start with '/': {path}")));
    }
    Ok(())
}

fn validate_identifier(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(BridgeError::ConfigError(format!("{name} cannot be empty")));
    }
    if let Some(ch) = value.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(BridgeError::ConfigError(format!(
            "{name} contains invalid character '{ch}': {value}"
        )));
    }
    Ok(())
}

fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_owned()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_owned()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_owned()
}

#[cfg(test)]
#[allow(
    clippy::unreachable,
    reason = "test code uses unreachable for expected-path assertions"
)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let config = BridgeConfig::from_toml(r#"base_url = "https://shop.example.com""#).unwrap();
        assert_eq!(config.api_prefix, "/rest/V1");
        assert_eq!(config.namespace, "m2");
        assert_eq!(config.default_currency, "USD");
        assert!(config.store_code.is_none());
        assert!(config.access_token.is_none());
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            base_url = "https://shop.example.com/"
            store_code = "default"
            namespace = "acme"
            default_currency = "EUR"
            access_token = "secret"

            [http]
            timeout_secs = 5
        "#;

        let config = BridgeConfig::from_toml(toml).unwrap();
        assert_eq!(config.namespace, "acme");
        assert_eq!(config.default_currency, "EUR");
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.rest_root(), "https://shop.example.com/rest/default/V1");
    }

    #[test]
    fn test_rest_root_without_store() {
        let config = BridgeConfig::new("https://shop.example.com");
        assert_eq!(config.rest_root(), "https://shop.example.com/rest/V1");
    }

    #[test]
    fn test_invalid_toml() {
        let Err(BridgeError::ConfigError(msg)) = BridgeConfig::from_toml("base_url = [") else {
            unreachable!("expected ConfigError")
        };
        assert!(msg.contains("invalid TOML config"));
    }

    #[test]
    fn test_missing_base_url() {
        assert!(BridgeConfig::from_toml("namespace = \"m2\"").is_err());
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = BridgeConfig::from_toml(r#"base_url = "ftp://shop.example.com""#);
        assert!(matches!(result, Err(BridgeError::ConfigError(_))));
    }

    #[test]
    fn test_allows_plain_http() {
        assert!(BridgeConfig::from_toml(r#"base_url = "http://shop.internal""#).is_ok());
    }

    #[test]
    fn test_rejects_bad_prefix() {
        let toml = r#"
            base_url = "https://shop.example.com"
            api_prefix = "/rest/../admin"
        "#;
        assert!(BridgeConfig::from_toml(toml).is_err());

        let toml = r#"
            base_url = "https://shop.example.com"
            api_prefix = "rest/V1"
        "#;
        assert!(BridgeConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_rejects_bad_namespace_and_currency() {
        let toml = r#"
            base_url = "https://shop.example.com"
            namespace = "m2-vendor"
        "#;
        assert!(BridgeConfig::from_toml(toml).is_err());

        let toml = r#"
            base_url = "https://shop.example.com"
            default_currency = "EURO"
        "#;
        assert!(BridgeConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_from_file_not_found() {
        let Err(BridgeError::ConfigError(msg)) = BridgeConfig::from_file("/nonexistent/bridge.toml")
        else {
            unreachable!("expected ConfigError")
        };
        assert!(msg.contains("cannot read config file"));
    }

    #[test]
    fn test_field_namespace() {
        let ns = FieldNamespace::default();
        assert_eq!(ns.name("status"), "m2_status");

        let field = ns.field("store_id", "1");
        assert_eq!(field.name, "m2_store_id");
        assert_eq!(field.value, "1");

        assert_eq!(ns.strip("m2_status"), Some("status"));
        assert_eq!(ns.strip("other_status"), None);
        assert_eq!(ns.strip("m2status"), None);
    }
}
