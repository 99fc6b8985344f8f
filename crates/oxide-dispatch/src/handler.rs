//! Handler references and the controller registry that resolves them.
//!
//! A route handler is either a closure or a symbolic reference to a
//! controller registered by name:
//!
//! - `Type.method` calls `method` on a fresh instance built by the factory
//!   registered for `Type`.
//! - `Type::method` calls a static method registered for `Type`, without
//!   building an instance.
//!
//! Type names may be namespaced (`admin::Users.show`). A leading `::` marks a
//! reference as absolute, so it is not qualified with the scope's namespace.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::request::PathParams;
use crate::response::Response;

/// A boxed handler function.
pub type Handler = Arc<dyn Fn(&PathParams) -> Response + Send + Sync>;

/// Builds controller instances for `Type.method` references.
type Factory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Separator between namespace segments, and the absolute-path marker.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// What a route invokes when it matches.
#[derive(Clone)]
pub enum HandlerRef {
    /// A closure called with the route's parameters.
    Direct(Handler),
    /// A symbolic controller method, resolved at invocation time.
    Controller {
        /// Fully qualified type name.
        controller: String,
        /// Method name.
        method: String,
        /// `Type::method` form.
        is_static: bool,
    },
    /// A string that is neither `Type.method` nor `Type::method`.
    Invalid(String),
}

impl HandlerRef {
    /// Wraps a closure.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&PathParams) -> Response + Send + Sync + 'static,
    {
        Self::Direct(Arc::new(f))
    }

    /// Parses a symbolic reference.
    ///
    /// Only the shape is checked here; whether the type exists is decided
    /// when the route is invoked.
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();

        if let Some((controller, method)) = reference.rsplit_once('.') {
            if is_type_path(controller) && is_identifier(method) {
                return Self::Controller {
                    controller: controller.to_string(),
                    method: method.to_string(),
                    is_static: false,
                };
            }
        } else if let Some((controller, method)) = reference.rsplit_once(NAMESPACE_SEPARATOR) {
            if is_type_path(controller) && is_identifier(method) {
                return Self::Controller {
                    controller: controller.to_string(),
                    method: method.to_string(),
                    is_static: true,
                };
            }
        }

        Self::Invalid(reference.to_string())
    }

    /// Returns `true` for controller references carrying the `::` root marker.
    pub fn is_absolute(&self) -> bool {
        matches!(
            self,
            Self::Controller { controller, .. } if controller.starts_with(NAMESPACE_SEPARATOR)
        )
    }

    /// Qualifies a relative controller reference with `namespace`.
    ///
    /// Absolute references lose their root marker; closures and invalid
    /// references are returned untouched.
    #[must_use]
    pub fn qualify(self, namespace: &str) -> Self {
        match self {
            Self::Controller {
                controller,
                method,
                is_static,
            } => {
                let controller = match controller.strip_prefix(NAMESPACE_SEPARATOR) {
                    Some(absolute) => absolute.to_string(),
                    None if namespace.is_empty() => controller,
                    None => format!("{namespace}{NAMESPACE_SEPARATOR}{controller}"),
                };
                Self::Controller {
                    controller,
                    method,
                    is_static,
                }
            }
            other => other,
        }
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct(..)"),
            Self::Controller { .. } | Self::Invalid(_) => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("<closure>"),
            Self::Controller {
                controller,
                method,
                is_static: false,
            } => write!(f, "{controller}.{method}"),
            Self::Controller {
                controller,
                method,
                is_static: true,
            } => write!(f, "{controller}{NAMESPACE_SEPARATOR}{method}"),
            Self::Invalid(reference) => f.write_str(reference),
        }
    }
}

/// Conversion into a [`HandlerRef`], accepted by every registration method.
pub trait IntoHandler {
    /// Performs the conversion.
    fn into_handler(self) -> HandlerRef;
}

impl<F> IntoHandler for F
where
    F: Fn(&PathParams) -> Response + Send + Sync + 'static,
{
    fn into_handler(self) -> HandlerRef {
        HandlerRef::func(self)
    }
}

impl IntoHandler for &str {
    fn into_handler(self) -> HandlerRef {
        HandlerRef::parse(self)
    }
}

impl IntoHandler for String {
    fn into_handler(self) -> HandlerRef {
        HandlerRef::parse(&self)
    }
}

impl IntoHandler for HandlerRef {
    fn into_handler(self) -> HandlerRef {
        self
    }
}

/// A controller whose methods are addressed by name.
pub trait Controller {
    /// Calls `method` with the route parameters.
    ///
    /// Returns `None` if the controller has no such method.
    fn call(&mut self, method: &str, params: &PathParams) -> Option<Response>;
}

/// Maps type names to controller factories and static methods.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, Factory>,
    statics: HashMap<String, HashMap<String, Handler>>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for `Type.method` references to `name`.
    pub fn register<C, F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.factories.insert(
            normalize(name).to_string(),
            Arc::new(move || Box::new(factory()) as Box<dyn Controller>),
        );
        self
    }

    /// Registers the static method `name::method`.
    pub fn register_static<F>(&mut self, name: &str, method: &str, f: F) -> &mut Self
    where
        F: Fn(&PathParams) -> Response + Send + Sync + 'static,
    {
        self.statics
            .entry(normalize(name).to_string())
            .or_default()
            .insert(method.to_string(), Arc::new(f));
        self
    }

    /// Returns `true` if `Type.method` references to `name` can be built.
    ///
    /// Static methods registered for `name` do not count.
    pub fn has_factory(&self, name: &str) -> bool {
        self.factories.contains_key(normalize(name))
    }

    /// Invokes a handler with the route parameters.
    ///
    /// Unknown types, unknown methods, and invalid references yield `None`.
    pub fn invoke(&self, handler: &HandlerRef, params: &PathParams) -> Option<Response> {
        match handler {
            HandlerRef::Direct(f) => Some(f(params)),
            HandlerRef::Controller {
                controller,
                method,
                is_static: false,
            } => {
                let Some(factory) = self.factories.get(normalize(controller)) else {
                    debug!(%controller, "no controller registered");
                    return None;
                };
                let response = factory().call(method, params);
                if response.is_none() {
                    debug!(%controller, %method, "controller has no such method");
                }
                response
            }
            HandlerRef::Controller {
                controller,
                method,
                is_static: true,
            } => {
                let found = self
                    .statics
                    .get(normalize(controller))
                    .and_then(|methods| methods.get(method));
                if let Some(f) = found {
                    Some(f(params))
                } else {
                    debug!(%controller, %method, "no static method registered");
                    None
                }
            }
            HandlerRef::Invalid(reference) => {
                debug!(%reference, "handler reference is not callable");
                None
            }
        }
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.factories.keys().collect::<Vec<_>>())
            .field("statics", &self.statics.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn normalize(name: &str) -> &str {
    name.strip_prefix(NAMESPACE_SEPARATOR).unwrap_or(name)
}

fn is_identifier(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_type_path(path: &str) -> bool {
    normalize(path)
        .split(NAMESPACE_SEPARATOR)
        .all(is_identifier)
}
