//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, Method, Version};

/// An immutable view of one incoming HTTP request.
///
/// Built once per request from the parsed hyper request plus the connection's
/// remote address; nothing here is mutated afterwards and nothing outlives
/// the request/response cycle.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) version: Version,
    pub(crate) headers: HeaderMap,
    pub(crate) remote_addr: SocketAddr,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string without the leading `?`, if the URI had one.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Header lookup by name. `HeaderMap` compares names case-insensitively;
    /// values that are not valid UTF-8 read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The HTTP version as it appears in a request line (`"1.1"`, `"2.0"`).
    pub fn http_version(&self) -> &'static str {
        match self.version {
            Version::HTTP_09 => "0.9",
            Version::HTTP_10 => "1.0",
            Version::HTTP_2 => "2.0",
            Version::HTTP_3 => "3.0",
            _ => "1.1",
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Bare GET request for unit tests.
    pub(crate) fn get(path: &str) -> Request {
        Request {
            method: Method::GET,
            path: path.to_owned(),
            query: None,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            remote_addr: "127.0.0.1:4000".parse().unwrap(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    pub(crate) fn get_with_header(path: &str, name: &str, value: &str) -> Request {
        let mut req = get(path);
        req.headers.insert(
            http::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            value.parse().unwrap(),
        );
        req
    }
}
