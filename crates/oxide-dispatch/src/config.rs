//! Router configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Header consulted for `POST` method overrides.
pub const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-Method-Override";

/// Options fixed when a [`Router`](crate::Router) is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Mount point stripped from every path. Overrides the request's own.
    pub base_path: Option<String>,
    /// Stop after the first matching route instead of running them all.
    pub stop_on_first_match: bool,
    /// Header carrying the overriding method of a `POST` request.
    pub method_override_header: String,
    /// Namespace of the router's root scope.
    pub namespace: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            stop_on_first_match: false,
            method_override_header: METHOD_OVERRIDE_HEADER.to_string(),
            namespace: String::new(),
        }
    }
}

impl RouterConfig {
    /// Parses a JSON config document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Manifest`](crate::RouterError::Manifest) for
    /// malformed JSON or unknown keys.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a manifest error
    /// if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::from_json("{}").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.method_override_header, "X-HTTP-Method-Override");
        assert!(!config.stop_on_first_match);
    }

    #[test]
    fn test_overrides() {
        let config = RouterConfig::from_json(
            r#"{"base_path": "/app", "stop_on_first_match": true, "namespace": "site"}"#,
        )
        .unwrap();
        assert_eq!(config.base_path.as_deref(), Some("/app"));
        assert!(config.stop_on_first_match);
        assert_eq!(config.namespace, "site");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(RouterConfig::from_json(r#"{"quit": true}"#).is_err());
    }
}
