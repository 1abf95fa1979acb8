//! Middleware-composition demo.
//!
//! Four routes, each exercising one pattern:
//!
//! - `/route` — route-scoped tiny-format access log
//! - `/endpoint` — route-scoped combined-format access log
//! - `/custom` — custom log template with a user-defined token
//! - `/protected` — token guard that short-circuits with a 401
//!
//! Two global steps run ahead of all of them: the dev-format access log and
//! a custom step printing the request method. Everything else, the
//! front-end page included, falls through to the static-file handler.
//!
//! Run with `cargo run`, then open <http://localhost:3000/> or:
//!
//! ```text
//! curl http://localhost:3000/route
//! curl http://localhost:3000/protected -H 'Authorization: secret-token'
//! ```

use std::sync::Arc;

use sumi::middleware::{AccessLog, TokenAuth};
use sumi::{Endpoint, Flow, Method, Middleware, Request, Response, Router, Server, StaticFiles};

const ADDR: &str = "0.0.0.0:3000";
const SECRET: &str = "secret-token";
const ASSET_ROOT: &str = "static";

/// Global demo step: any side-effecting code slots into the chain this way.
struct MethodPrinter;

impl Middleware for MethodPrinter {
    fn before(&self, req: &Request) -> Flow {
        println!("Custom Middleware - Request Type: {}", req.method());
        Flow::Continue
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let assets = Arc::new(StaticFiles::new(ASSET_ROOT));

    let app = Router::new()
        .layer(AccessLog::dev())
        .layer(MethodPrinter)
        .on(
            Method::GET,
            "/route",
            Endpoint::new(route_message).layer(AccessLog::tiny()),
        )
        .on(
            Method::GET,
            "/endpoint",
            Endpoint::new(endpoint_message).layer(AccessLog::combined()),
        )
        .on(
            Method::GET,
            "/custom",
            Endpoint::new(custom_message).layer(
                AccessLog::custom(":method :url :custom :status :res[content-length] - :response-time ms")
                    .define("custom", "Custom Token"),
            ),
        )
        .on(
            Method::GET,
            "/protected",
            Endpoint::new(protected_message).layer(TokenAuth::new(SECRET)),
        )
        .fallback(move |req: Request| {
            let assets = Arc::clone(&assets);
            async move { assets.serve(req.path()).await }
        });

    Server::bind(ADDR).serve(app).await.expect("server error");
}

async fn route_message(_req: Request) -> Response {
    Response::text("Route with Morgan middleware")
}

async fn endpoint_message(_req: Request) -> Response {
    Response::text("Endpoint with Morgan middleware")
}

async fn custom_message(_req: Request) -> Response {
    Response::text("Custom Morgan middleware")
}

async fn protected_message(_req: Request) -> Response {
    Response::text("This is a protected route")
}
