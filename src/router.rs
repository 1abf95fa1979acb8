//! Request router and chain runner.
//!
//! One radix tree per HTTP method (O(path-length) lookup via [`matchit`]),
//! plus the middleware chains the trees lead to. Routing and chain execution
//! live together here on purpose: the router is the one place that knows the
//! full order of operations for a request —
//!
//! 1. every global step's `before`, in registration order;
//! 2. the matched endpoint's steps' `before`, in registration order;
//! 3. the terminal handler (or the fallback for unmatched paths);
//! 4. every entered step's `after`, in reverse order, with the completed
//!    [`AccessRecord`].
//!
//! A step returning [`Flow::Respond`] at stage 1 or 2 skips straight to
//! stage 4 — its response is final. Exactly one response is produced per
//! request, always.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use http::{Method, StatusCode};
use matchit::Router as PathTree;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{AccessRecord, Flow, Middleware};
use crate::request::Request;
use crate::response::Response;

/// A terminal handler plus the route-scoped steps that run ahead of it.
///
/// ```rust,no_run
/// # use sumi::middleware::{AccessLog, TokenAuth};
/// # use sumi::{Endpoint, Request, Response};
/// # async fn secrets(_req: Request) -> Response { Response::text("") }
/// Endpoint::new(secrets)
///     .layer(AccessLog::tiny())
///     .layer(TokenAuth::new("secret-token"));
/// ```
///
/// Steps run in the order `layer` was called.
pub struct Endpoint {
    steps: Vec<Arc<dyn Middleware>>,
    handler: BoxedHandler,
}

impl Endpoint {
    pub fn new(handler: impl Handler) -> Self {
        Self { steps: Vec::new(), handler: handler.into_boxed_handler() }
    }

    /// Appends a route-scoped middleware step.
    pub fn layer(mut self, step: impl Middleware) -> Self {
        self.steps.push(Arc::new(step));
        self
    }
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every registration method returns `self` so the whole table reads as one
/// chained expression.
pub struct Router {
    global: Vec<Arc<dyn Middleware>>,
    routes: HashMap<Method, PathTree<Endpoint>>,
    fallback: Option<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { global: Vec::new(), routes: HashMap::new(), fallback: None }
    }

    /// Appends a global middleware step. Global steps run on every request —
    /// matched or not — before any route-scoped step.
    pub fn layer(mut self, step: impl Middleware) -> Self {
        self.global.push(Arc::new(step));
        self
    }

    /// Registers an endpoint for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves
    /// them in the handler.
    pub fn on(mut self, method: Method, path: &str, endpoint: Endpoint) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, endpoint)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Shorthand for a GET endpoint with no route-scoped steps.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, Endpoint::new(handler))
    }

    /// Handler for requests no route matches, evaluated after the global
    /// steps. Without one, unmatched paths get an empty 404.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    /// Runs one request through its full chain and produces the response.
    pub(crate) async fn dispatch(&self, mut req: Request) -> Response {
        let started = Instant::now();
        let mut record = AccessRecord::begin(&req);

        // The matchit `Match` borrows the path it was given, so the lookup
        // works on an owned copy and only owned params flow back into `req`.
        let path = req.path().to_owned();
        let matched = self
            .routes
            .get(req.method())
            .and_then(|tree| tree.at(&path).ok());
        let (endpoint, params) = match matched {
            Some(m) => (
                Some(m.value),
                m.params
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect(),
            ),
            None => (None, HashMap::new()),
        };
        req.params = params;

        let route_steps: &[Arc<dyn Middleware>] = match endpoint {
            Some(e) => &e.steps,
            None => &[],
        };
        let steps: Vec<&Arc<dyn Middleware>> =
            self.global.iter().chain(route_steps).collect();

        let mut early = None;
        let mut entered = 0;
        for step in &steps {
            entered += 1;
            if let Flow::Respond(res) = step.before(&req) {
                early = Some(res);
                break;
            }
        }

        let response = match early {
            Some(res) => res,
            None => match endpoint {
                Some(e) => e.handler.call(req).await,
                None => match &self.fallback {
                    Some(f) => f.call(req).await,
                    None => Response::status(StatusCode::NOT_FOUND),
                },
            },
        };

        record.complete(&response, started.elapsed());
        for step in steps[..entered].iter().rev() {
            step.after(&record);
        }

        response
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
