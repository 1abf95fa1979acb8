//! Token-check middleware.

use http::StatusCode;

use super::{Flow, Middleware};
use crate::request::Request;
use crate::response::Response;

/// Guards a route behind a literal `Authorization` header value.
///
/// This is a demonstration of chain short-circuiting, not authentication:
/// the header must byte-for-byte equal the configured secret. On mismatch —
/// or a missing header — the step answers `401 Unauthorized` itself and the
/// rest of the chain, terminal handler included, never runs.
pub struct TokenAuth {
    secret: String,
}

impl TokenAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

impl Middleware for TokenAuth {
    fn before(&self, req: &Request) -> Flow {
        if req.header("authorization") == Some(self.secret.as_str()) {
            Flow::Continue
        } else {
            Flow::Respond(
                Response::builder()
                    .status(StatusCode::UNAUTHORIZED)
                    .text("Unauthorized"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::fixtures;

    fn flow_status(flow: Flow) -> Option<StatusCode> {
        match flow {
            Flow::Continue => None,
            Flow::Respond(res) => Some(res.status_code()),
        }
    }

    #[test]
    fn matching_token_continues() {
        let guard = TokenAuth::new("secret-token");
        let req = fixtures::get_with_header("/protected", "authorization", "secret-token");
        assert!(flow_status(guard.before(&req)).is_none());
    }

    #[test]
    fn missing_header_responds_401() {
        let guard = TokenAuth::new("secret-token");
        let flow = guard.before(&fixtures::get("/protected"));
        match flow {
            Flow::Respond(res) => {
                assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
                assert_eq!(res.body(), b"Unauthorized");
            }
            Flow::Continue => panic!("guard let an unauthenticated request through"),
        }
    }

    #[test]
    fn wrong_token_responds_401() {
        let guard = TokenAuth::new("secret-token");
        let req = fixtures::get_with_header("/protected", "authorization", "Bearer secret-token");
        assert_eq!(flow_status(guard.before(&req)), Some(StatusCode::UNAUTHORIZED));
    }
}
