//! Middleware layer.
//!
//! A middleware step is a value implementing [`Middleware`]. The router walks
//! each request's chain — global steps first, then the matched route's steps
//! — calling [`before`](Middleware::before) on each. A step either returns
//! [`Flow::Continue`] or ends the request right there with
//! [`Flow::Respond`]; there is no `next` callback to remember to call.
//!
//! Once a response exists (from the terminal handler or from a
//! short-circuiting step), every step whose `before` ran gets its
//! [`after`](Middleware::after) hook in reverse order, with a completed
//! [`AccessRecord`]. A step that only logs implements `after` and leaves
//! `before` at its default.
//!
//! Built-in steps:
//! - [`AccessLog`] — morgan-style access-log lines (dev, tiny, combined, or a
//!   custom token template)
//! - [`TokenAuth`] — literal `Authorization` header check, 401 on mismatch

mod access_log;
mod auth;

pub use access_log::AccessLog;
pub use auth::TokenAuth;

use std::net::SocketAddr;
use std::time::Duration;

use http::{Method, StatusCode};

use crate::request::Request;
use crate::response::Response;

/// What a step tells the router to do next.
pub enum Flow {
    /// Hand control to the next step, or to the terminal handler if this was
    /// the last one.
    Continue,
    /// Stop here: this response is final, later steps and the terminal
    /// handler never run.
    Respond(Response),
}

/// One step in a request-processing chain.
///
/// Both hooks have no-op defaults; implement whichever the step needs.
/// `before` runs ahead of the terminal handler and may short-circuit;
/// `after` observes the finished exchange and cannot change it.
pub trait Middleware: Send + Sync + 'static {
    fn before(&self, req: &Request) -> Flow {
        let _ = req;
        Flow::Continue
    }

    fn after(&self, record: &AccessRecord) {
        let _ = record;
    }
}

/// Snapshot of one request/response exchange, handed to `after` hooks.
///
/// The request half is captured before the terminal handler runs (the handler
/// consumes the [`Request`]); the response half is filled in once the
/// response exists. Never stored beyond the request cycle.
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub http_version: &'static str,
    pub remote_addr: SocketAddr,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub status: StatusCode,
    pub body_bytes: usize,
    pub elapsed: Duration,
}

impl AccessRecord {
    /// Captures the request half. Status and timing hold placeholder values
    /// until [`complete`](AccessRecord::complete).
    pub(crate) fn begin(req: &Request) -> Self {
        Self {
            method: req.method().clone(),
            path: req.path().to_owned(),
            query: req.query().map(str::to_owned),
            http_version: req.http_version(),
            remote_addr: req.remote_addr(),
            referrer: req.header("referer").map(str::to_owned),
            user_agent: req.header("user-agent").map(str::to_owned),
            status: StatusCode::OK,
            body_bytes: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub(crate) fn complete(&mut self, res: &Response, elapsed: Duration) {
        self.status = res.status_code();
        self.body_bytes = res.body().len();
        self.elapsed = elapsed;
    }

    /// Path plus query string, as morgan's `:url` token renders it.
    pub fn url(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn record(method: Method, path: &str, status: StatusCode) -> AccessRecord {
        AccessRecord {
            method,
            path: path.to_owned(),
            query: None,
            http_version: "1.1",
            remote_addr: "192.0.2.7:52110".parse().unwrap(),
            referrer: None,
            user_agent: None,
            status,
            body_bytes: 0,
            elapsed: Duration::from_micros(1500),
        }
    }
}
