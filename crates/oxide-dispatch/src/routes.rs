//! The route registration surface shared by routers and route groups.

use crate::error::Result;
use crate::handler::IntoHandler;
use crate::path::PathPattern;
use crate::request::Method;
use crate::scope::{DOMAIN_DELIMITER, Scope};
use crate::table::{Fallback, Phase, Route, RouteTable};

/// Scope-aware route registration.
///
/// Every registration prefixes the pattern with the scope's prefix,
/// qualifies relative controller references with its namespace, and
/// restricts the route to its domain. Derived routers (`prefix`, `ns`,
/// `domain`, `group`, `mount`) carry a copy of the scope, so nothing
/// registered through them changes the parent's scope.
///
/// # Example
///
/// ```
/// use oxide_dispatch::{PathParams, Response, Router, Routes};
///
/// let mut router = Router::new();
/// router.get("/", |_: &PathParams| Response::text("home"));
/// router.mount("/api", |api| {
///     api.ns("api").get("/users/{id}", "Users.show");
///     api.domain("admin.example.com").get("/stats", "::Stats::summary");
/// });
/// assert_eq!(router.routes().count(), 3);
/// ```
pub trait Routes {
    /// The scope applied to registrations.
    fn scope(&self) -> &Scope;

    /// The table registrations are written to.
    fn table_mut(&mut self) -> &mut RouteTable;

    /// Registers a primary route for several methods.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`](crate::RouterError::InvalidPattern)
    /// if the scoped pattern is malformed.
    fn try_on(
        &mut self,
        methods: &[Method],
        pattern: &str,
        handler: impl IntoHandler,
    ) -> Result<&mut Self> {
        register(self, Phase::After, methods, pattern, handler)?;
        Ok(self)
    }

    /// Registers a before-route for several methods.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`](crate::RouterError::InvalidPattern)
    /// if the scoped pattern is malformed.
    fn try_before(
        &mut self,
        methods: &[Method],
        pattern: &str,
        handler: impl IntoHandler,
    ) -> Result<&mut Self> {
        register(self, Phase::Before, methods, pattern, handler)?;
        Ok(self)
    }

    /// Registers a primary route for several methods.
    ///
    /// # Panics
    ///
    /// Panics if the scoped pattern is malformed.
    fn on(
        &mut self,
        methods: &[Method],
        pattern: &str,
        handler: impl IntoHandler,
    ) -> &mut Self {
        register(self, Phase::After, methods, pattern, handler)
            .unwrap_or_else(|e| panic!("{e}"));
        self
    }

    /// Registers a before-route, run for its side effects ahead of the
    /// primary routes.
    ///
    /// # Panics
    ///
    /// Panics if the scoped pattern is malformed.
    fn before(
        &mut self,
        methods: &[Method],
        pattern: &str,
        handler: impl IntoHandler,
    ) -> &mut Self {
        register(self, Phase::Before, methods, pattern, handler)
            .unwrap_or_else(|e| panic!("{e}"));
        self
    }

    /// Adds a GET route.
    fn get(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut Self {
        self.on(&[Method::Get], pattern, handler)
    }

    /// Adds a POST route.
    fn post(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut Self {
        self.on(&[Method::Post], pattern, handler)
    }

    /// Adds a PUT route.
    fn put(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut Self {
        self.on(&[Method::Put], pattern, handler)
    }

    /// Adds a PATCH route.
    fn patch(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut Self {
        self.on(&[Method::Patch], pattern, handler)
    }

    /// Adds a DELETE route.
    fn delete(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut Self {
        self.on(&[Method::Delete], pattern, handler)
    }

    /// Adds an OPTIONS route.
    fn options(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut Self {
        self.on(&[Method::Options], pattern, handler)
    }

    /// Adds a HEAD route.
    ///
    /// HEAD requests are dispatched to GET routes, so these routes are only
    /// listed, never reached.
    fn head(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut Self {
        self.on(&[Method::Head], pattern, handler)
    }

    /// Adds a route for every method.
    fn all(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut Self {
        self.on(&Method::ALL, pattern, handler)
    }

    /// Adds a not-found handler for the scope's domain.
    ///
    /// A handler for the request's domain is preferred over a
    /// domain-agnostic one, whatever the registration order.
    fn set_404(&mut self, handler: impl IntoHandler) -> &mut Self {
        let scope = self.scope();
        let fallback = Fallback {
            handler: scope.qualify(handler.into_handler()),
            domain: scope.domain().map(str::to_string),
        };
        self.table_mut().push_fallback(fallback);
        self
    }

    /// Registers routes through a derived router sharing this scope.
    fn group<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut ScopedRoutes<'_>),
    {
        let scope = self.scope().clone();
        f(&mut ScopedRoutes::new(self.table_mut(), scope));
        self
    }

    /// Registers routes through a derived router under `prefix`.
    fn mount<F>(&mut self, prefix: &str, f: F) -> &mut Self
    where
        F: FnOnce(&mut ScopedRoutes<'_>),
    {
        f(&mut self.prefix(prefix));
        self
    }

    /// Returns a derived router under `prefix`.
    fn prefix(&mut self, prefix: &str) -> ScopedRoutes<'_> {
        let scope = self.scope().with_prefix(prefix);
        ScopedRoutes::new(self.table_mut(), scope)
    }

    /// Returns a derived router in `namespace`.
    fn ns(&mut self, namespace: &str) -> ScopedRoutes<'_> {
        let scope = self.scope().with_namespace(namespace);
        ScopedRoutes::new(self.table_mut(), scope)
    }

    /// Returns a derived router restricted to `domain`, nested with `.`.
    fn domain(&mut self, domain: &str) -> ScopedRoutes<'_> {
        self.domain_with(domain, DOMAIN_DELIMITER)
    }

    /// Returns a derived router restricted to `domain`, nested with
    /// `delimiter`.
    fn domain_with(&mut self, domain: &str, delimiter: &str) -> ScopedRoutes<'_> {
        let scope = self.scope().with_domain(domain, delimiter);
        ScopedRoutes::new(self.table_mut(), scope)
    }
}

/// A router derived from another, owning its own scope.
#[derive(Debug)]
pub struct ScopedRoutes<'r> {
    table: &'r mut RouteTable,
    scope: Scope,
}

impl<'r> ScopedRoutes<'r> {
    pub(crate) fn new(table: &'r mut RouteTable, scope: Scope) -> Self {
        Self { table, scope }
    }
}

impl Routes for ScopedRoutes<'_> {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn table_mut(&mut self) -> &mut RouteTable {
        &mut *self.table
    }
}

fn register<R: Routes + ?Sized>(
    routes: &mut R,
    phase: Phase,
    methods: &[Method],
    pattern: &str,
    handler: impl IntoHandler,
) -> Result<()> {
    let scope = routes.scope();
    let compiled = PathPattern::parse(&scope.path(pattern))?;
    let handler = scope.qualify(handler.into_handler());
    let domain = scope.domain().map(str::to_string);

    let table = routes.table_mut();
    for &method in methods {
        table.push(
            phase,
            method,
            Route::new(compiled.clone(), handler.clone(), domain.clone()),
        );
    }
    Ok(())
}
