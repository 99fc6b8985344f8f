//! oxide-dispatch CLI
//!
//! Loads a route manifest and shows which handler a request reaches.
//! Every controller named by the manifest is backed by a stand-in that
//! echoes the call it received.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_dispatch::{
    BufferedSink, Controller, HandlerRef, Method, PathParams, Phase, Request, Response,
    RouteManifest, Router, RouterConfig,
};

/// Inspect and exercise a route manifest.
#[derive(Parser)]
#[command(name = "oxide-dispatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route manifest (JSON).
    #[arg(short, long, env = "OXIDE_DISPATCH_MANIFEST", default_value = "routes.json")]
    manifest: PathBuf,

    /// Router config (JSON).
    #[arg(short, long, env = "OXIDE_DISPATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered routes.
    Routes,

    /// Dispatch one request and print the outcome.
    Dispatch {
        /// Request method.
        method: String,

        /// Request URI, query string allowed.
        uri: String,

        /// Host the request is addressed to.
        #[arg(long)]
        host: Option<String>,

        /// Extra header, as `Name: value`.
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Mount point of the application.
        #[arg(long, default_value = "/")]
        base_path: String,
    },
}

/// Answers every call with a description of it.
struct Echo {
    controller: String,
}

impl Controller for Echo {
    fn call(&mut self, method: &str, params: &PathParams) -> Option<Response> {
        Some(describe(&self.controller, method, params))
    }
}

fn describe(controller: &str, method: &str, params: &PathParams) -> Response {
    Response::json(&json!({
        "controller": controller,
        "method": method,
        "params": params.values().collect::<Vec<_>>(),
    }))
}

/// Backs every symbolic handler in the router with an [`Echo`].
fn register_echoes(router: &mut Router) {
    let mut handlers: Vec<HandlerRef> = Vec::new();
    for method in Method::ALL {
        for phase in [Phase::Before, Phase::After] {
            handlers.extend(
                router
                    .table()
                    .routes(phase, method)
                    .iter()
                    .map(|r| r.handler.clone()),
            );
        }
    }
    handlers.extend(router.fallbacks().iter().map(|f| f.handler.clone()));

    let registry = router.controllers_mut();
    for handler in handlers {
        let HandlerRef::Controller {
            controller,
            method,
            is_static,
        } = handler
        else {
            continue;
        };
        if is_static {
            let name = controller.clone();
            let called = method.clone();
            registry.register_static(&controller, &method, move |params: &PathParams| {
                describe(&name, &called, params)
            });
        } else if !registry.has_factory(&controller) {
            let name = controller.clone();
            registry.register(&controller, move || Echo {
                controller: name.clone(),
            });
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => RouterConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RouterConfig::default(),
    };
    let manifest = RouteManifest::load(&cli.manifest)
        .with_context(|| format!("loading manifest {}", cli.manifest.display()))?;

    let mut router = Router::with_config(config);
    manifest.apply(&mut router)?;
    register_echoes(&mut router);
    info!(
        routes = router.routes().count(),
        manifest = %cli.manifest.display(),
        "manifest loaded"
    );

    match cli.command {
        Commands::Routes => {
            println!("\n{:<8} {:<40} {:<40} DOMAIN", "METHOD", "PATTERN", "HANDLER");
            println!("{:-<100}", "");
            for (method, route) in router.routes() {
                println!(
                    "{:<8} {:<40} {:<40} {}",
                    method.as_str(),
                    route.pattern.pattern(),
                    route.handler.to_string(),
                    route.domain.as_deref().unwrap_or("*")
                );
            }
            for fallback in router.fallbacks() {
                println!(
                    "{:<8} {:<40} {:<40} {}",
                    "404",
                    "",
                    fallback.handler.to_string(),
                    fallback.domain.as_deref().unwrap_or("*")
                );
            }
            println!();
        }

        Commands::Dispatch {
            method,
            uri,
            host,
            headers,
            base_path,
        } => {
            let mut request = Request::new(method, &uri).base_path(base_path);
            if let Some(host) = host {
                request = request.host(host);
            }
            for header in headers {
                let Some((name, value)) = header.split_once(':') else {
                    bail!("malformed header {header:?}, expected `Name: value`");
                };
                request = request.header(name.trim(), value.trim());
            }

            let (effective, suppress_body) = router.effective_method(&request);
            let current_uri = router.current_uri(&request);

            let mut sink = BufferedSink::new();
            let handled = router.run(&request, &mut sink);
            let response = sink.take();

            let outcome = json!({
                "method": request.method,
                "effective_method": effective.map(|m| m.as_str()),
                "uri": current_uri,
                "handled": handled,
                "suppress_body": suppress_body,
                "status": response.as_ref().map(|r| r.status),
                "status_text": response.as_ref().map(Response::status_text),
                "body": response.as_ref().and_then(Response::body_string),
            });
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_dispatch::Routes;

    fn body(router: &Router, request: &Request) -> Option<serde_json::Value> {
        let dispatch = router.dispatch(request);
        dispatch
            .response
            .as_ref()
            .and_then(Response::body_string)
            .map(|body| serde_json::from_str(&body).unwrap())
    }

    #[test]
    fn test_echoes_back_static_and_instance_methods_of_one_type() {
        let mut router = Router::new();
        router.get("/count", "Users::count");
        router.get("/users/{id}", "Users.show");
        register_echoes(&mut router);

        assert_eq!(
            body(&router, &Request::get("/users/7")),
            Some(json!({ "controller": "Users", "method": "show", "params": ["7"] }))
        );
        assert_eq!(
            body(&router, &Request::get("/count")),
            Some(json!({ "controller": "Users", "method": "count", "params": [] }))
        );
    }

    #[test]
    fn test_echoes_back_not_found_handlers() {
        let mut router = Router::new();
        router.ns("site").set_404("Errors.missing");
        register_echoes(&mut router);

        assert_eq!(
            body(&router, &Request::get("/nowhere")),
            Some(json!({ "controller": "site::Errors", "method": "missing", "params": [] }))
        );
    }
}
