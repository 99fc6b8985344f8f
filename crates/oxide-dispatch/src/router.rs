//! Main router implementation.

use tracing::{debug, trace};

use crate::config::RouterConfig;
use crate::handler::ControllerRegistry;
use crate::request::{Method, PathParams, RequestSource};
use crate::response::{Response, ResponseSink};
use crate::routes::Routes;
use crate::scope::Scope;
use crate::table::{Fallback, Phase, Route, RouteTable};

/// The outcome of dispatching one request.
#[derive(Debug)]
pub struct Dispatch {
    /// Method used for matching, after HEAD and override substitution.
    /// `None` for methods the router does not know.
    pub method: Option<Method>,
    /// Path matched against the routes, base path removed.
    pub uri: String,
    /// Number of primary routes that matched.
    pub matched: usize,
    /// Response of the last matching route that produced one, or of the
    /// not-found handler when nothing matched.
    pub response: Option<Response>,
    /// Set for HEAD requests.
    pub suppress_body: bool,
}

impl Dispatch {
    /// Returns `true` if at least one primary route matched.
    pub fn is_handled(&self) -> bool {
        self.matched > 0
    }
}

/// The main router for dispatching requests.
///
/// Routes are registered through the [`Routes`] trait during setup; once
/// built, dispatching only needs `&self`.
#[derive(Debug, Default)]
pub struct Router {
    /// Registered routes.
    table: RouteTable,
    /// Root scope.
    scope: Scope,
    /// Targets of symbolic handler references.
    controllers: ControllerRegistry,
    config: RouterConfig,
}

impl Router {
    /// Creates a new empty router with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty router.
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            table: RouteTable::new(),
            scope: Scope::new().with_namespace(&config.namespace),
            controllers: ControllerRegistry::new(),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Returns the controller registry.
    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// Returns the controller registry for registration.
    pub fn controllers_mut(&mut self) -> &mut ControllerRegistry {
        &mut self.controllers
    }

    /// Returns the route table.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Iterates over primary routes, grouped by method.
    pub fn routes(&self) -> impl Iterator<Item = (Method, &Route)> + '_ {
        Method::ALL.into_iter().flat_map(move |method| {
            self.table
                .routes(Phase::After, method)
                .iter()
                .map(move |route| (method, route))
        })
    }

    /// Returns the not-found handlers.
    pub fn fallbacks(&self) -> &[Fallback] {
        self.table.fallbacks()
    }

    /// Determines the method used for matching.
    ///
    /// HEAD is matched as GET with the body suppressed. POST is matched as
    /// PUT, DELETE, or PATCH when the override header names one of them.
    /// Returns the method (if routable) and whether to suppress the body.
    pub fn effective_method<R>(&self, request: &R) -> (Option<Method>, bool)
    where
        R: RequestSource + ?Sized,
    {
        match request.method().parse::<Method>().ok() {
            Some(Method::Head) => (Some(Method::Get), true),
            Some(Method::Post) => {
                let overridden = request
                    .header(&self.config.method_override_header)
                    .and_then(|value| value.trim().parse::<Method>().ok())
                    .filter(|m| matches!(m, Method::Put | Method::Delete | Method::Patch));
                (Some(overridden.unwrap_or(Method::Post)), false)
            }
            other => (other, false),
        }
    }

    /// Returns the request path relative to the base path, with a leading
    /// slash and no trailing slash.
    pub fn current_uri<R: RequestSource + ?Sized>(&self, request: &R) -> String {
        let base = self
            .config
            .base_path
            .as_deref()
            .unwrap_or_else(|| request.base_path())
            .trim_end_matches('/');
        let path = request.path();
        let relative = path
            .strip_prefix(base)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(path);
        format!("/{}", relative.trim_matches('/'))
    }

    /// Runs the before-routes, then the primary routes, then the not-found
    /// handler if no primary route matched.
    ///
    /// Every matching primary route is invoked; the response of the last one
    /// that produced a response wins. With
    /// [`stop_on_first_match`](RouterConfig::stop_on_first_match) set,
    /// matching stops at the first route instead.
    pub fn dispatch<R: RequestSource + ?Sized>(&self, request: &R) -> Dispatch {
        let (method, suppress_body) = self.effective_method(request);
        let uri = self.current_uri(request);
        let host = request.host().filter(|h| !h.is_empty());

        debug!(
            method = request.method(),
            effective = ?method,
            uri = %uri,
            host = ?host,
            "dispatching request"
        );

        let (matched, response) = match method {
            Some(method) => {
                self.handle(self.table.routes(Phase::Before, method), &uri, host, false);
                self.handle(
                    self.table.routes(Phase::After, method),
                    &uri,
                    host,
                    self.config.stop_on_first_match,
                )
            }
            None => (0, None),
        };

        let response = if matched > 0 {
            debug!(matched, "request handled");
            response
        } else {
            self.fallback(host)
        };

        Dispatch {
            method,
            uri,
            matched,
            response,
            suppress_body,
        }
    }

    /// Dispatches a request and hands the result to `sink`.
    ///
    /// Returns `true` if a primary route matched.
    pub fn run<R, S>(&self, request: &R, sink: &mut S) -> bool
    where
        R: RequestSource + ?Sized,
        S: ResponseSink + ?Sized,
    {
        self.run_with(request, sink, || {})
    }

    /// Like [`run`](Self::run), calling `finish` after a primary route
    /// matched and before the response is emitted.
    pub fn run_with<R, S, F>(&self, request: &R, sink: &mut S, finish: F) -> bool
    where
        R: RequestSource + ?Sized,
        S: ResponseSink + ?Sized,
        F: FnOnce(),
    {
        let dispatch = self.dispatch(request);
        let suppress_body = dispatch.suppress_body;

        if dispatch.is_handled() {
            finish();
            if let Some(response) = dispatch.response {
                sink.emit(response, suppress_body);
            }
            true
        } else {
            match dispatch.response {
                Some(response) => sink.emit(response, suppress_body),
                None => sink.not_found(suppress_body),
            }
            false
        }
    }

    /// Runs `routes` against `uri`, returning the match count and the last
    /// response produced.
    fn handle(
        &self,
        routes: &[Route],
        uri: &str,
        host: Option<&str>,
        stop_on_first_match: bool,
    ) -> (usize, Option<Response>) {
        let mut matched = 0;
        let mut response = None;

        for route in routes {
            if !route.serves(host) {
                continue;
            }
            let Some(params) = route.pattern.match_path(uri) else {
                continue;
            };

            trace!(
                pattern = route.pattern.pattern(),
                handler = %route.handler,
                "route matched"
            );

            if let Some(produced) = self.controllers.invoke(&route.handler, &params) {
                response = Some(produced);
            }
            matched += 1;

            if stop_on_first_match {
                break;
            }
        }

        (matched, response)
    }

    /// Invokes the not-found handler for `host`.
    ///
    /// A handler registered for the host's domain beats a domain-agnostic
    /// one; among equals the first registered wins.
    fn fallback(&self, host: Option<&str>) -> Option<Response> {
        let fallbacks = self.table.fallbacks();
        let selected = fallbacks
            .iter()
            .find(|f| f.domain.is_some() && f.serves(host))
            .or_else(|| fallbacks.iter().find(|f| f.domain.is_none()));
        let Some(fallback) = selected else {
            debug!("no route matched");
            return None;
        };
        debug!(handler = %fallback.handler, "no route matched; using not-found handler");
        self.controllers.invoke(&fallback.handler, &PathParams::new())
    }
}

impl Routes for Router {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn table_mut(&mut self) -> &mut RouteTable {
        &mut self.table
    }
}
