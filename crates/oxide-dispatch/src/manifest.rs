//! Route manifests: route tables described as JSON.
//!
//! A manifest is a tree of groups. Each group may set a prefix, namespace,
//! and domain, and holds before-routes, primary routes, a not-found handler,
//! and nested groups. Handlers are symbolic references resolved through the
//! router's [`ControllerRegistry`](crate::ControllerRegistry).
//!
//! ```json
//! {
//!   "namespace": "app",
//!   "routes": [{ "methods": "GET", "pattern": "/", "handler": "Pages.home" }],
//!   "groups": [{
//!     "prefix": "/api",
//!     "domain": "example.com",
//!     "before": [{ "methods": "*", "pattern": "/{any}", "handler": "Auth.check" }],
//!     "routes": [{ "methods": "GET|HEAD", "pattern": "/users/{id}", "handler": "Users.show" }],
//!     "not_found": "Errors.api"
//!   }]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::request::Method;
use crate::routes::{Routes, ScopedRoutes};
use crate::scope::{DOMAIN_DELIMITER, Scope};

/// One route of a manifest group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    /// `|`-separated methods, or `*` for all of them.
    pub methods: String,
    /// Path pattern, relative to the group prefix.
    pub pattern: String,
    /// Symbolic handler reference.
    pub handler: String,
}

impl RouteEntry {
    /// Parses the method list.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::UnknownMethod`](crate::RouterError::UnknownMethod)
    /// for an unrecognised method.
    pub fn methods(&self) -> Result<Vec<Method>> {
        if self.methods.trim() == "*" {
            Ok(Method::ALL.to_vec())
        } else {
            Method::parse_list(&self.methods)
        }
    }
}

/// A group of routes sharing a scope; the manifest root is a group too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteManifest {
    /// Prefix appended to the parent's.
    pub prefix: Option<String>,
    /// Namespace appended to the parent's; `::name` replaces it.
    pub namespace: Option<String>,
    /// Domain nested under the parent's.
    pub domain: Option<String>,
    /// Delimiter used to nest `domain`. Defaults to `.`.
    pub delimiter: Option<String>,
    /// Before-routes.
    pub before: Vec<RouteEntry>,
    /// Primary routes.
    pub routes: Vec<RouteEntry>,
    /// Not-found handler for the group's domain.
    pub not_found: Option<String>,
    /// Nested groups.
    pub groups: Vec<RouteManifest>,
}

impl RouteManifest {
    /// Parses a JSON manifest.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Manifest`](crate::RouterError::Manifest) for
    /// malformed JSON or unknown keys.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON manifest file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a manifest error
    /// if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Registers the manifest's routes on `routes`.
    ///
    /// Routes registered before an error is found stay registered.
    ///
    /// # Errors
    ///
    /// Returns the first malformed pattern or unknown method encountered.
    pub fn apply<R: Routes + ?Sized>(&self, routes: &mut R) -> Result<()> {
        let scope = self.derive(routes.scope());
        let mut scoped = ScopedRoutes::new(routes.table_mut(), scope);

        for entry in &self.before {
            scoped.try_before(&entry.methods()?, &entry.pattern, entry.handler.as_str())?;
        }
        for entry in &self.routes {
            scoped.try_on(&entry.methods()?, &entry.pattern, entry.handler.as_str())?;
        }
        if let Some(handler) = &self.not_found {
            scoped.set_404(handler.as_str());
        }
        for group in &self.groups {
            group.apply(&mut scoped)?;
        }

        Ok(())
    }

    fn derive(&self, parent: &Scope) -> Scope {
        let mut scope = parent.clone();
        if let Some(prefix) = &self.prefix {
            scope = scope.with_prefix(prefix);
        }
        if let Some(namespace) = &self.namespace {
            scope = scope.with_namespace(namespace);
        }
        if let Some(domain) = &self.domain {
            let delimiter = self.delimiter.as_deref().unwrap_or(DOMAIN_DELIMITER);
            scope = scope.with_domain(domain, delimiter);
        }
        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouterError;
    use crate::router::Router;

    const MANIFEST: &str = r#"{
        "namespace": "app",
        "routes": [{ "methods": "GET", "pattern": "/", "handler": "Pages.home" }],
        "not_found": "Errors.missing",
        "groups": [{
            "prefix": "/api",
            "namespace": "api",
            "domain": "example.com",
            "before": [{ "methods": "*", "pattern": "/{any}", "handler": "Auth.check" }],
            "routes": [
                { "methods": "GET|PUT", "pattern": "/users/{id}", "handler": "Users.show" },
                { "methods": "GET", "pattern": "/stats", "handler": "::Stats::count" }
            ],
            "groups": [{ "domain": "eu", "delimiter": "-", "not_found": "Errors.eu" }]
        }]
    }"#;

    #[test]
    fn test_apply_manifest() {
        let manifest = RouteManifest::from_json(MANIFEST).unwrap();
        let mut router = Router::new();
        manifest.apply(&mut router).unwrap();

        let routes: Vec<_> = router
            .routes()
            .map(|(method, route)| {
                (
                    method,
                    route.pattern.pattern().to_string(),
                    route.handler.to_string(),
                    route.domain.clone(),
                )
            })
            .collect();

        let domain = Some("example.com".to_string());
        assert_eq!(
            routes,
            [
                (Method::Get, "/".to_string(), "app::Pages.home".to_string(), None),
                (
                    Method::Get,
                    "/api/users/{id}".to_string(),
                    "app::api::Users.show".to_string(),
                    domain.clone()
                ),
                (
                    Method::Get,
                    "/api/stats".to_string(),
                    "Stats::count".to_string(),
                    domain.clone()
                ),
                (
                    Method::Put,
                    "/api/users/{id}".to_string(),
                    "app::api::Users.show".to_string(),
                    domain
                ),
            ]
        );

        let fallbacks = router.fallbacks();
        assert_eq!(fallbacks.len(), 2);
        assert_eq!(fallbacks[1].domain.as_deref(), Some("eu-example.com"));
        assert_eq!(fallbacks[1].handler.to_string(), "app::api::Errors.eu");
    }

    #[test]
    fn test_unknown_method() {
        let manifest = RouteManifest::from_json(
            r#"{ "routes": [{ "methods": "BREW", "pattern": "/", "handler": "Pot.brew" }] }"#,
        )
        .unwrap();
        let err = manifest.apply(&mut Router::new()).unwrap_err();
        assert!(matches!(err, RouterError::UnknownMethod(m) if m == "BREW"));
    }

    #[test]
    fn test_malformed_pattern() {
        let manifest = RouteManifest::from_json(
            r#"{ "routes": [{ "methods": "GET", "pattern": "/{id", "handler": "A.b" }] }"#,
        )
        .unwrap();
        let err = manifest.apply(&mut Router::new()).unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));
    }

    #[test]
    fn test_demo_manifest() {
        let manifest = RouteManifest::from_json(include_str!("../demos/routes.json")).unwrap();
        let mut router = Router::new();
        manifest.apply(&mut router).unwrap();
        assert_eq!(router.routes().count(), 9);
        assert_eq!(router.fallbacks().len(), 2);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            RouteManifest::from_json(r#"{ "paths": [] }"#),
            Err(RouterError::Manifest(_))
        ));
    }
}
