//! Route scopes: the prefix, namespace, and domain a route group inherits.

use crate::handler::{HandlerRef, NAMESPACE_SEPARATOR};

/// Default delimiter used when nesting domains.
pub const DOMAIN_DELIMITER: &str = ".";

/// The context applied to every route registered within a group.
///
/// Scopes are values: every derivation returns a new scope and leaves the
/// receiver untouched, so sibling groups never observe each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    prefix: String,
    namespace: String,
    domain: Option<String>,
}

impl Scope {
    /// Creates the root scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Path prefix, without a trailing slash. Empty at the root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Namespace used to qualify controller references.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Domain the scope's routes are restricted to.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Returns a scope with `prefix` appended to the current prefix.
    ///
    /// ```
    /// use oxide_dispatch::Scope;
    ///
    /// let scope = Scope::new().with_prefix("/a").with_prefix("b/");
    /// assert_eq!(scope.prefix(), "/a/b");
    /// assert_eq!(scope.prefix(), Scope::new().with_prefix("/a/b").prefix());
    /// ```
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let mut prefix = self.path(prefix);
        if prefix == "/" {
            prefix.clear();
        }
        Self {
            prefix,
            ..self.clone()
        }
    }

    /// Returns a scope with `namespace` appended, or substituted when it
    /// starts with the `::` root marker.
    #[must_use]
    pub fn with_namespace(&self, namespace: &str) -> Self {
        let namespace = match namespace.strip_prefix(NAMESPACE_SEPARATOR) {
            Some(absolute) => absolute.to_string(),
            None if self.namespace.is_empty() => namespace.to_string(),
            None if namespace.is_empty() => self.namespace.clone(),
            None => format!("{}{NAMESPACE_SEPARATOR}{namespace}", self.namespace),
        };
        Self {
            namespace,
            ..self.clone()
        }
    }

    /// Returns a scope restricted to `domain`, nested under the current
    /// domain with `delimiter`.
    ///
    /// ```
    /// use oxide_dispatch::Scope;
    ///
    /// let scope = Scope::new().with_domain("example.com", ".").with_domain("api", ".");
    /// assert_eq!(scope.domain(), Some("api.example.com"));
    /// ```
    #[must_use]
    pub fn with_domain(&self, domain: &str, delimiter: &str) -> Self {
        let domain = match &self.domain {
            Some(current) => format!("{domain}{delimiter}{current}"),
            None => domain.to_string(),
        };
        Self {
            domain: Some(domain),
            ..self.clone()
        }
    }

    /// Joins `pattern` onto the prefix.
    pub fn path(&self, pattern: &str) -> String {
        let joined = format!(
            "{}/{}",
            self.prefix.trim_end_matches('/'),
            pattern.trim_matches('/')
        );
        if self.prefix.is_empty() && joined == "/" {
            joined
        } else {
            joined.trim_end_matches('/').to_string()
        }
    }

    /// Qualifies a handler reference with the namespace.
    pub fn qualify(&self, handler: HandlerRef) -> HandlerRef {
        handler.qualify(&self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_derivation_is_associative() {
        let root = Scope::new();
        let nested = root.with_prefix("/a").with_prefix("/b");
        let direct = root.with_prefix("/a/b");
        assert_eq!(nested.prefix(), "/a/b");
        assert_eq!(nested.prefix(), direct.prefix());
        assert_eq!(root.prefix(), "");
    }

    #[test]
    fn test_parent_is_not_mutated() {
        let parent = Scope::new().with_prefix("/v1").with_namespace("api");
        let _child = parent
            .with_prefix("/admin")
            .with_namespace("admin")
            .with_domain("example.com", DOMAIN_DELIMITER);
        assert_eq!(parent.prefix(), "/v1");
        assert_eq!(parent.namespace(), "api");
        assert_eq!(parent.domain(), None);
    }

    #[test]
    fn test_path_joining() {
        let root = Scope::new();
        assert_eq!(root.path("/"), "/");
        assert_eq!(root.path("/users/"), "/users");
        assert_eq!(root.path("users"), "/users");

        let v1 = root.with_prefix("/v1");
        assert_eq!(v1.path("/admin/{id}"), "/v1/admin/{id}");
        assert_eq!(v1.path("/"), "/v1");
    }

    #[test]
    fn test_root_prefix_collapses() {
        assert_eq!(Scope::new().with_prefix("/").prefix(), "");
        assert_eq!(Scope::new().with_prefix("/").path("/x"), "/x");
    }

    #[test]
    fn test_namespace_derivation() {
        let scope = Scope::new().with_namespace("app").with_namespace("admin");
        assert_eq!(scope.namespace(), "app::admin");
        assert_eq!(scope.with_namespace("::other").namespace(), "other");
        assert_eq!(scope.with_namespace("").namespace(), "app::admin");
    }

    #[test]
    fn test_domain_derivation() {
        let scope = Scope::new()
            .with_domain("example.com", DOMAIN_DELIMITER)
            .with_domain("eu", "-")
            .with_domain("api", DOMAIN_DELIMITER);
        assert_eq!(scope.domain(), Some("api.eu-example.com"));
    }

    #[test]
    fn test_qualify_handler() {
        let scope = Scope::new().with_namespace("app");
        let handler = scope.qualify(HandlerRef::parse("Users.show"));
        assert_eq!(handler.to_string(), "app::Users.show");
    }
}
