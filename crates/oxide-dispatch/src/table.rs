//! Route storage, grouped by dispatch phase and method.

use std::collections::HashMap;

use crate::handler::HandlerRef;
use crate::path::PathPattern;
use crate::request::Method;

/// The dispatch phase a route belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Middleware-style routes, run for their side effects.
    Before,
    /// Primary handlers.
    After,
}

/// A single route definition.
#[derive(Debug, Clone)]
pub struct Route {
    /// Path pattern, already prefixed by its scope.
    pub pattern: PathPattern,
    /// Handler, already qualified by its scope's namespace.
    pub handler: HandlerRef,
    /// Domain the route is restricted to.
    pub domain: Option<String>,
}

impl Route {
    /// Creates a new route.
    pub fn new(pattern: PathPattern, handler: HandlerRef, domain: Option<String>) -> Self {
        Self {
            pattern,
            handler,
            domain,
        }
    }

    /// Parameter names, in capture order.
    pub fn param_names(&self) -> &[String] {
        self.pattern.param_names()
    }

    /// Returns `true` if the route may serve a request addressed to `host`.
    ///
    /// Domain-agnostic routes serve every host. Qualified routes need a host
    /// equal to their domain, compared without the port and ignoring case.
    pub fn serves(&self, host: Option<&str>) -> bool {
        domain_matches(self.domain.as_deref(), host)
    }
}

/// A not-found handler, selected by domain alone.
#[derive(Debug, Clone)]
pub struct Fallback {
    /// Handler invoked with no parameters.
    pub handler: HandlerRef,
    /// Domain the fallback is restricted to.
    pub domain: Option<String>,
}

impl Fallback {
    /// Returns `true` if the fallback applies to `host`.
    pub fn serves(&self, host: Option<&str>) -> bool {
        domain_matches(self.domain.as_deref(), host)
    }
}

/// All registered routes, in registration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    before: HashMap<Method, Vec<Route>>,
    after: HashMap<Method, Vec<Route>>,
    not_found: Vec<Fallback>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route for `(phase, method)`.
    pub fn push(&mut self, phase: Phase, method: Method, route: Route) {
        let routes = match phase {
            Phase::Before => &mut self.before,
            Phase::After => &mut self.after,
        };
        routes.entry(method).or_default().push(route);
    }

    /// Appends a not-found fallback.
    pub fn push_fallback(&mut self, fallback: Fallback) {
        self.not_found.push(fallback);
    }

    /// Routes for `(phase, method)`, first-registered first.
    pub fn routes(&self, phase: Phase, method: Method) -> &[Route] {
        let routes = match phase {
            Phase::Before => &self.before,
            Phase::After => &self.after,
        };
        routes.get(&method).map(Vec::as_slice).unwrap_or_default()
    }

    /// Not-found fallbacks, first-registered first.
    pub fn fallbacks(&self) -> &[Fallback] {
        &self.not_found
    }
}

fn domain_matches(domain: Option<&str>, host: Option<&str>) -> bool {
    let Some(domain) = domain else {
        return true;
    };
    host.map(strip_port)
        .is_some_and(|host| host.eq_ignore_ascii_case(domain))
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port))
            if !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && (name.ends_with(']') || !name.contains(':')) =>
        {
            name
        }
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(pattern: &str, domain: Option<&str>) -> Route {
        Route::new(
            PathPattern::new(pattern),
            HandlerRef::parse("Pages.show"),
            domain.map(str::to_string),
        )
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut table = RouteTable::new();
        table.push(Phase::After, Method::Get, route("/b", None));
        table.push(Phase::After, Method::Get, route("/a", None));
        table.push(Phase::Before, Method::Get, route("/c", None));

        let patterns: Vec<_> = table
            .routes(Phase::After, Method::Get)
            .iter()
            .map(|r| r.pattern.pattern())
            .collect();
        assert_eq!(patterns, ["/b", "/a"]);
        assert_eq!(table.routes(Phase::Before, Method::Get).len(), 1);
        assert!(table.routes(Phase::After, Method::Post).is_empty());
    }

    #[test]
    fn test_domain_agnostic_route_serves_everyone() {
        let r = route("/", None);
        assert!(r.serves(None));
        assert!(r.serves(Some("example.com")));
    }

    #[test]
    fn test_domain_qualified_route() {
        let r = route("/", Some("api.example.com"));
        assert!(r.serves(Some("api.example.com")));
        assert!(r.serves(Some("API.example.com:8080")));
        assert!(!r.serves(Some("www.example.com")));
        assert!(!r.serves(None));
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com:80"), "example.com");
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("[::1]:8080"), "[::1]");
        assert_eq!(strip_port("[::1]"), "[::1]");
        assert_eq!(strip_port("::1"), "::1");
    }
}
