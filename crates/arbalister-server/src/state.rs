//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::AuthToken;
use crate::config::normalize_base_url;

/// Read-only state available to all request handlers.
#[derive(Debug)]
pub struct AppState {
    /// Canonical directory that request paths are resolved against.
    pub root_dir: PathBuf,

    /// URL prefix of every route, always starting and ending with `/`.
    pub base_url: String,

    /// Token required from clients.
    pub token: AuthToken,
}

impl AppState {
    /// `root_dir` must already be canonical.
    pub fn new(root_dir: PathBuf, base_url: &str, token: AuthToken) -> Self {
        Self {
            root_dir,
            base_url: normalize_base_url(base_url),
            token,
        }
    }
}

/// Type alias used in axum handlers.
pub type SharedState = Arc<AppState>;
