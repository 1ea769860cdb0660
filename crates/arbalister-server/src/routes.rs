//! HTTP routes.

use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;

use arbalister_core::FileFormat;
use arbalister_core::ipc_stream::{ARROW_STREAM_MIME, encode_ipc_stream};
use arbalister_datafusion::{get_table_reader, new_session_context};

use crate::config::url_path_join;
use crate::error::AppError;
use crate::paths::resolve_data_file;
use crate::state::{AppState, SharedState};

/// Routes mounted under `base_url`.
pub fn router(base_url: &str) -> Router<SharedState> {
    Router::new().route(
        &url_path_join(base_url, "arrow/stream/{*path}"),
        get(stream_handler),
    )
}

/// `GET <base_url>/arrow/stream/<path>`: the whole file as one Arrow IPC stream.
async fn stream_handler(
    State(state): State<SharedState>,
    UrlPath(path): UrlPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let body = load_ipc_stream(&state, &path)
        .await
        .map_err(|e| e.for_path(&path))?;

    Ok(([(CONTENT_TYPE, ARROW_STREAM_MIME)], body))
}

async fn load_ipc_stream(state: &AppState, path: &str) -> Result<Vec<u8>, AppError> {
    let file = resolve_data_file(&state.root_dir, path).await?;
    let format = FileFormat::from_path(&file)?;

    // One context per request; nothing is shared between loads.
    let ctx = new_session_context();
    let table = get_table_reader(format)?.read(&ctx, &file).await?;

    // TODO: write batches straight to the response body instead of buffering
    // the encoded stream.
    let body = encode_ipc_stream(&table)?;

    tracing::info!(
        path = %path,
        format = %format,
        rows = table.num_rows(),
        bytes = body.len(),
        "streamed table"
    );
    Ok(body)
}
