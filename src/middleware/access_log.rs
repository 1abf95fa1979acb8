//! Morgan-style access-log middleware.
//!
//! One line per request, rendered from a token template:
//!
//! - `dev` — `:method :url :status :response-time ms - :res[content-length]`
//! - `tiny` — `:method :url :status :res[content-length] - :response-time ms`
//! - `combined` — Apache combined format with referrer and user-agent
//! - custom — any template you pass to [`AccessLog::custom`]
//!
//! Templates are compiled once at construction into literal and token
//! segments; rendering walks the segments against the request's
//! [`AccessRecord`]. User-defined tokens are constants registered on the
//! value with [`define`](AccessLog::define) — per-instance, not process-wide.
//! Lines go to stdout unless a sink is installed with
//! [`with_sink`](AccessLog::with_sink).

use std::sync::Arc;

use chrono::{Local, Utc};

use super::{AccessRecord, Middleware};

const DEV: &str = ":method :url :status :response-time ms - :res[content-length]";
const TINY: &str = ":method :url :status :res[content-length] - :response-time ms";
const COMBINED: &str = ":remote-addr - :remote-user [:date[clf]] \
                       \":method :url HTTP/:http-version\" :status \
                       :res[content-length] \":referrer\" \":user-agent\"";

type Sink = Arc<dyn Fn(&str) + Send + Sync>;

/// Access-log middleware step.
///
/// Logging happens entirely in the `after` hook, so the line always carries
/// the final status — including a 401 produced by a guard later in the chain.
pub struct AccessLog {
    segments: Vec<Segment>,
    defined: Vec<(String, String)>,
    sink: Sink,
}

enum Segment {
    Literal(String),
    /// `:name` or `:name[arg]` in the template.
    Token { name: String, arg: Option<String> },
}

impl AccessLog {
    /// Compact development format: method, url, status, response time, size.
    pub fn dev() -> Self {
        Self::custom(DEV)
    }

    /// The shortest predefined format.
    pub fn tiny() -> Self {
        Self::custom(TINY)
    }

    /// Apache combined format, with referrer and user-agent.
    pub fn combined() -> Self {
        Self::custom(COMBINED)
    }

    /// A user-supplied token template. Unknown tokens render as `-`.
    pub fn custom(template: &str) -> Self {
        Self {
            segments: compile(template),
            defined: Vec::new(),
            sink: Arc::new(|line| println!("{line}")),
        }
    }

    /// Registers a constant user-defined token for this instance.
    ///
    /// A template containing `:custom` renders the value passed here.
    pub fn define(mut self, name: &str, value: &str) -> Self {
        self.defined.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Redirects output away from stdout — tests capture lines this way.
    pub fn with_sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    fn render(&self, record: &AccessRecord) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Token { name, arg } => {
                    line.push_str(&self.token_value(name, arg.as_deref(), record));
                }
            }
        }
        line
    }

    fn token_value(&self, name: &str, arg: Option<&str>, record: &AccessRecord) -> String {
        match name {
            "method" => record.method.to_string(),
            "url" => record.url(),
            "status" => record.status.as_u16().to_string(),
            "res" => match arg {
                // The only response header this server always knows.
                Some("content-length") if record.body_bytes > 0 => {
                    record.body_bytes.to_string()
                }
                _ => "-".to_owned(),
            },
            "response-time" => {
                format!("{:.3}", record.elapsed.as_secs_f64() * 1000.0)
            }
            "remote-addr" => record.remote_addr.ip().to_string(),
            "remote-user" => "-".to_owned(),
            "date" => match arg {
                Some("clf") => Local::now().format("%d/%b/%Y:%H:%M:%S %z").to_string(),
                _ => Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
            },
            "http-version" => record.http_version.to_owned(),
            "referrer" => record.referrer.clone().unwrap_or_else(|| "-".to_owned()),
            "user-agent" => record.user_agent.clone().unwrap_or_else(|| "-".to_owned()),
            defined => self
                .defined
                .iter()
                .find(|(n, _)| n == defined)
                .map_or_else(|| "-".to_owned(), |(_, v)| v.clone()),
        }
    }
}

impl Middleware for AccessLog {
    fn after(&self, record: &AccessRecord) {
        (self.sink)(&self.render(record));
    }
}

/// Splits a template into literal and token segments.
///
/// A token is `:` followed by one or more of `[a-z0-9_-]`, optionally with a
/// bracketed argument (`:res[content-length]`, `:date[clf]`). A `:` not
/// followed by a token character stays literal.
fn compile(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != ':' || !chars.peek().is_some_and(|n| is_token_char(*n)) {
            literal.push(c);
            continue;
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }

        let mut name = String::new();
        while let Some(&n) = chars.peek() {
            if !is_token_char(n) {
                break;
            }
            name.push(n);
            chars.next();
        }

        let mut arg = None;
        if chars.peek() == Some(&'[') {
            chars.next();
            let mut inner = String::new();
            for c in chars.by_ref() {
                if c == ']' {
                    break;
                }
                inner.push(c);
            }
            arg = Some(inner);
        }

        segments.push(Segment::Token { name, arg });
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::{Method, StatusCode};

    use super::*;
    use crate::middleware::fixtures::record;

    fn render(log: &AccessLog, rec: &AccessRecord) -> String {
        log.render(rec)
    }

    #[test]
    fn dev_format_line() {
        let mut rec = record(Method::GET, "/route", StatusCode::OK);
        rec.body_bytes = 27;
        let line = render(&AccessLog::dev(), &rec);
        assert_eq!(line, "GET /route 200 1.500 ms - 27");
    }

    #[test]
    fn tiny_format_line() {
        let mut rec = record(Method::GET, "/route", StatusCode::OK);
        rec.body_bytes = 27;
        let line = render(&AccessLog::tiny(), &rec);
        assert_eq!(line, "GET /route 200 27 - 1.500 ms");
    }

    #[test]
    fn combined_format_includes_referrer_and_user_agent() {
        let mut rec = record(Method::GET, "/endpoint", StatusCode::OK);
        rec.referrer = Some("https://example.com/".to_owned());
        rec.user_agent = Some("curl/8.5.0".to_owned());
        rec.body_bytes = 30;
        let line = render(&AccessLog::combined(), &rec);
        assert!(line.starts_with("192.0.2.7 - - ["));
        assert!(line.contains("\"GET /endpoint HTTP/1.1\" 200 30"));
        assert!(line.contains("\"https://example.com/\""));
        assert!(line.contains("\"curl/8.5.0\""));
    }

    #[test]
    fn defined_token_renders_its_constant() {
        let log = AccessLog::custom(":method :url :custom :status")
            .define("custom", "Custom Token");
        let line = render(&log, &record(Method::GET, "/custom", StatusCode::OK));
        assert_eq!(line, "GET /custom Custom Token 200");
    }

    #[test]
    fn unknown_token_renders_dash() {
        let log = AccessLog::custom(":method :nonsense");
        let line = render(&log, &record(Method::GET, "/", StatusCode::OK));
        assert_eq!(line, "GET -");
    }

    #[test]
    fn empty_body_renders_dash_for_content_length() {
        let line = render(&AccessLog::tiny(), &record(Method::GET, "/x", StatusCode::NOT_FOUND));
        assert_eq!(line, "GET /x 404 - - 1.500 ms");
    }

    #[test]
    fn url_token_includes_query_string() {
        let mut rec = record(Method::GET, "/route", StatusCode::OK);
        rec.query = Some("page=2".to_owned());
        let line = render(&AccessLog::custom(":url"), &rec);
        assert_eq!(line, "/route?page=2");
    }

    #[test]
    fn colon_not_starting_a_token_stays_literal() {
        let line = render(&AccessLog::custom("at :method ::"), &record(Method::GET, "/", StatusCode::OK));
        // The second `:` begins no token; both survive as literal text.
        assert_eq!(line, "at GET ::");
    }

    #[test]
    fn after_hook_emits_through_the_sink() {
        let lines: Arc<Mutex<Vec<String>>> = Arc::default();
        let captured = Arc::clone(&lines);
        let log = AccessLog::tiny().with_sink(move |line| {
            captured.lock().unwrap().push(line.to_owned());
        });
        log.after(&record(Method::GET, "/route", StatusCode::OK));
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("GET /route 200"));
    }
}
