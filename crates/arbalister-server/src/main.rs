//! `arbalister-server`: serve data files as Arrow IPC streams over HTTP.

use std::sync::Arc;

use arbalister_server::config::{ServerArgs, url_path_join};
use arbalister_server::error::{BindSnafu, ConfigSnafu, ServeSnafu, ServerError};
use clap::Parser;
use snafu::ResultExt;
use tracing_subscriber::EnvFilter;

async fn run() -> Result<(), ServerError> {
    let args = ServerArgs::parse();
    let config = args.into_config().await.context(ConfigSnafu)?;

    if !config.token.is_enabled() {
        tracing::warn!("no --token given, authentication is disabled");
    }

    let addr = config.addr;
    let state = Arc::new(config.into_state());
    tracing::info!(
        addr = %addr,
        root_dir = %state.root_dir.display(),
        route = %url_path_join(&state.base_url, "arrow/stream/<path>"),
        "arbalister-server starting"
    );

    let app = arbalister_server::app(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(BindSnafu { addr })?;
    axum::serve(listener, app).await.context(ServeSnafu)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
