//! Token authentication middleware.
//!
//! When a token is configured, every request must present it, either as an
//! `Authorization: token <t>` / `Authorization: Bearer <t>` header or as a
//! `token=<t>` query parameter. Requests without a valid token are rejected
//! with `403 Forbidden` before any handler runs.
//!
//! Without a configured token the middleware is a no-op (open mode).

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::SharedState;

/// Server token. `None` means authentication is disabled.
#[derive(Clone, Debug)]
pub struct AuthToken(Option<Arc<str>>);

impl AuthToken {
    /// Require `token` from every client.
    pub fn required(token: impl AsRef<str>) -> Self {
        Self(Some(Arc::from(token.as_ref())))
    }

    /// Accept every request.
    pub fn disabled() -> Self {
        Self(None)
    }

    /// Whether authentication is active.
    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Check a client-supplied token.
    pub fn validate(&self, candidate: &str) -> bool {
        match &self.0 {
            Some(token) => constant_time_eq(token.as_bytes(), candidate.as_bytes()),
            None => true,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Token from `Authorization: token <t>` or `Authorization: Bearer <t>`.
fn extract_header_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let scheme_ok = scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
    scheme_ok.then(|| token.trim())
}

/// Percent-decoded token from a `token=<t>` query parameter.
fn extract_query_token(uri: &Uri) -> Option<String> {
    let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params.remove("token").filter(|t| !t.is_empty())
}

/// Axum middleware rejecting requests without the server token.
pub async fn auth_middleware(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.token.is_enabled() {
        return next.run(request).await;
    }

    let candidate = extract_header_token(request.headers())
        .map(str::to_string)
        .or_else(|| extract_query_token(request.uri()));

    let rejection = match candidate {
        Some(token) if state.token.validate(&token) => None,
        Some(_) => Some("invalid token"),
        None => Some("missing token"),
    };

    match rejection {
        None => next.run(request).await,
        Some(reason) => {
            tracing::warn!(uri = %request.uri().path(), reason, "rejected unauthenticated request");
            AppError::forbidden(reason).into_response()
        }
    }
}
