//! # sumi
//!
//! A tiny HTTP server built around one idea: the middleware chain is an
//! explicit, ordered list of steps the router walks — not a stack of nested
//! callbacks.
//!
//! ## The contract
//!
//! Each route owns a chain: zero or more [`Middleware`] steps followed by
//! exactly one terminal handler. A step inspects the request and returns
//! [`Flow::Continue`] to hand control onward, or [`Flow::Respond`] to
//! short-circuit everything after it — later steps and the handler included.
//! Global steps registered with [`Router::layer`] run first, on every request,
//! before route dispatch. After the response exists, each step that ran gets
//! its `after` hook, in reverse order, with a completed [`AccessRecord`] —
//! that is where access-log lines come from.
//!
//! There is no ambient state anywhere: log formats, user-defined tokens, and
//! output sinks are fields of the [`AccessLog`] value you build at startup and
//! attach to the router.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use sumi::middleware::{AccessLog, TokenAuth};
//! use sumi::{Endpoint, Method, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .layer(AccessLog::dev())
//!         .get("/hello", hello)
//!         .on(
//!             Method::GET,
//!             "/admin",
//!             Endpoint::new(admin).layer(TokenAuth::new("secret-token")),
//!         );
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn hello(_req: Request) -> Response {
//!     Response::text("hello")
//! }
//!
//! async fn admin(_req: Request) -> Response {
//!     Response::text("admins only")
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod static_files;

pub mod middleware;

pub use error::Error;
pub use handler::Handler;
pub use middleware::{AccessLog, AccessRecord, Flow, Middleware, TokenAuth};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::{Endpoint, Router};
pub use server::Server;
pub use static_files::StaticFiles;

/// HTTP method, re-exported from the `http` crate. Routes are keyed by it.
pub use http::Method;
/// HTTP status code, re-exported from the `http` crate.
pub use http::StatusCode;
