//! Arrow IPC streaming endpoint.
//!
//! # Endpoints
//!
//! - `GET <base_url>/arrow/stream/<path>`: loads `<path>` (relative to the
//!   server root directory) with DataFusion and answers with the whole table
//!   as an Arrow IPC stream (`application/vnd.apache.arrow.stream`).
//!
//! Every route requires the server token when one is configured.

pub mod auth;
pub mod config;
pub mod error;
pub mod paths;
pub mod routes;
pub mod state;

use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

/// Build the application router for `state`.
pub fn app(state: SharedState) -> Router {
    Router::new()
        .merge(routes::router(&state.base_url))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
