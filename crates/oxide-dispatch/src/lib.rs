//! # oxide-dispatch
//!
//! A request router with scoped route groups and symbolic controllers.
//!
//! This crate provides:
//! - Path patterns with positional `{name}` parameters
//! - Before-routes that run ahead of the primary routes
//! - Nested route groups inheriting a prefix, namespace, and domain
//! - Handlers given as closures or as `Type.method` / `Type::method` names
//! - Per-domain not-found handlers
//!
//! ## Quick Start
//!
//! ```
//! use oxide_dispatch::{BufferedSink, PathParams, Request, Response, Router, Routes};
//!
//! let mut router = Router::new();
//! router.get("/users/{id}", |params: &PathParams| {
//!     Response::text(format!("user {}", &params[0]))
//! });
//!
//! let mut sink = BufferedSink::new();
//! assert!(router.run(&Request::get("/users/42"), &mut sink));
//! assert_eq!(sink.response().unwrap().body_string(), Some("user 42".to_string()));
//! ```
//!
//! ## Dispatch
//!
//! A request first runs every matching before-route for its method, then
//! every matching primary route. When several primary routes match, all of
//! them run and the last response wins, unless
//! [`RouterConfig::stop_on_first_match`] is set. When none match, the
//! not-found handler for the request's domain runs, falling back to a
//! domain-agnostic one, or the sink emits a plain 404.
//!
//! `HEAD` requests are matched as `GET` with the body suppressed, and `POST`
//! requests may name `PUT`, `DELETE`, or `PATCH` in the
//! `X-HTTP-Method-Override` header.
//!
//! ## Route Groups
//!
//! ```
//! use oxide_dispatch::{Controller, PathParams, Request, Response, Router, Routes};
//!
//! struct Users;
//!
//! impl Controller for Users {
//!     fn call(&mut self, method: &str, params: &PathParams) -> Option<Response> {
//!         (method == "show").then(|| Response::text(&params[0]))
//!     }
//! }
//!
//! let mut router = Router::new();
//! router.controllers_mut().register("admin::Users", || Users);
//! router.mount("/admin", |admin| {
//!     admin.ns("admin").get("/users/{id}", "Users.show");
//! });
//!
//! let dispatch = router.dispatch(&Request::get("/admin/users/7"));
//! assert_eq!(dispatch.matched, 1);
//! ```

mod config;
mod error;
mod handler;
mod manifest;
mod path;
mod request;
mod response;
mod router;
mod routes;
mod scope;
mod table;

pub use config::{METHOD_OVERRIDE_HEADER, RouterConfig};
pub use error::{Result, RouterError};
pub use handler::{Controller, ControllerRegistry, Handler, HandlerRef, IntoHandler};
pub use manifest::{RouteEntry, RouteManifest};
pub use path::PathPattern;
pub use request::{Method, PathParams, Request, RequestSource};
pub use response::{BufferedSink, Response, ResponseSink};
pub use router::{Dispatch, Router};
pub use routes::{Routes, ScopedRoutes};
pub use scope::{DOMAIN_DELIMITER, Scope};
pub use table::{Fallback, Phase, Route, RouteTable};
