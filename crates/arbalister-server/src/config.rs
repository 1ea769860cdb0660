//! Command line configuration of the server.

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use snafu::prelude::*;

use crate::auth::AuthToken;
use crate::state::AppState;

/// Serve data files under a root directory as Arrow IPC streams.
#[derive(Parser, Debug, Clone)]
#[command(name = "arbalister-server", version, about)]
pub struct ServerArgs {
    /// Directory that request paths are resolved against (`~` is expanded).
    #[arg(long, default_value = ".")]
    pub root_dir: PathBuf,

    /// URL prefix of every route.
    #[arg(long, default_value = "/")]
    pub base_url: String,

    /// Bind address.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value = "8888")]
    pub port: u16,

    /// Token clients must present. Without it the server accepts every request.
    #[arg(long)]
    pub token: Option<String>,
}

/// Errors produced while turning arguments into a configuration.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// The root directory does not exist or cannot be resolved.
    #[snafu(display("Root directory not found or not accessible: {path}"))]
    RootDir {
        /// Root directory as given.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The root path is not a directory.
    #[snafu(display("Root path is not a directory: {path}"))]
    RootNotDirectory {
        /// Canonical root path.
        path: String,
    },

    /// The host could not be resolved.
    #[snafu(display("Cannot resolve listen address {host}:{port}: {source}"))]
    ListenAddr {
        /// Host as given.
        host: String,
        /// Port as given.
        port: u16,
        /// Underlying lookup error.
        source: io::Error,
    },

    /// The host resolved to no address.
    #[snafu(display("Listen address {host}:{port} resolved to nothing"))]
    NoListenAddr {
        /// Host as given.
        host: String,
        /// Port as given.
        port: u16,
    },
}

/// Resolved server configuration.
#[derive(Debug)]
pub struct ServerConfig {
    /// Address to bind.
    pub addr: SocketAddr,
    /// Canonical root directory.
    pub root_dir: PathBuf,
    /// Normalized URL prefix.
    pub base_url: String,
    /// Client token.
    pub token: AuthToken,
}

impl ServerArgs {
    /// Validate the arguments, resolve the root directory and the listen
    /// address.
    pub async fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let expanded = expand_user(&self.root_dir);
        let root_dir = std::fs::canonicalize(&expanded).context(RootDirSnafu {
            path: self.root_dir.display().to_string(),
        })?;
        ensure!(
            root_dir.is_dir(),
            RootNotDirectorySnafu {
                path: root_dir.display().to_string(),
            }
        );

        let addr = resolve_listen_addr(&self.host, self.port).await?;

        let token = match self.token.filter(|t| !t.is_empty()) {
            Some(t) => AuthToken::required(t),
            None => AuthToken::disabled(),
        };

        Ok(ServerConfig {
            addr,
            root_dir,
            base_url: normalize_base_url(&self.base_url),
            token,
        })
    }
}

impl ServerConfig {
    /// Shared state handed to the router.
    pub fn into_state(self) -> AppState {
        AppState::new(self.root_dir, &self.base_url, self.token)
    }
}

/// First address `host` resolves to. Accepts IP literals (IPv6 with or
/// without brackets) and host names such as `localhost`.
async fn resolve_listen_addr(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    let mut addrs = tokio::net::lookup_host((bare, port))
        .await
        .context(ListenAddrSnafu { host, port })?;
    addrs.next().context(NoListenAddrSnafu { host, port })
}

/// Expand a leading `~` to the home directory.
fn expand_user(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Ensure the prefix starts and ends with exactly one `/`.
pub fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// Join URL path pieces with single slashes.
pub fn url_path_join(base: &str, suffix: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        suffix.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn args(root: &Path) -> ServerArgs {
        ServerArgs::parse_from(["arbalister-server", "--root-dir", &root.display().to_string()])
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(normalize_base_url(""), "/");
        assert_eq!(normalize_base_url("/"), "/");
        assert_eq!(normalize_base_url("user/alice"), "/user/alice/");
        assert_eq!(normalize_base_url("/user/alice/"), "/user/alice/");
    }

    #[test]
    fn url_join_collapses_slashes() {
        assert_eq!(url_path_join("/", "arrow/stream"), "/arrow/stream");
        assert_eq!(url_path_join("/lab/", "/arrow/stream"), "/lab/arrow/stream");
    }

    #[tokio::test]
    async fn defaults_resolve() -> TestResult {
        let tmp = TempDir::new()?;
        let config = args(tmp.path()).into_config().await?;

        assert_eq!(config.addr, "127.0.0.1:8888".parse()?);
        assert_eq!(config.root_dir, std::fs::canonicalize(tmp.path())?);
        assert_eq!(config.base_url, "/");
        assert!(!config.token.is_enabled());
        Ok(())
    }

    #[tokio::test]
    async fn token_and_ipv6_host() -> TestResult {
        let tmp = TempDir::new()?;
        let root = tmp.path().display().to_string();
        let config = ServerArgs::parse_from([
            "arbalister-server",
            "--root-dir",
            &root,
            "--host",
            "::1",
            "--port",
            "9000",
            "--token",
            "abc",
        ])
        .into_config()
        .await?;

        assert_eq!(config.addr, "[::1]:9000".parse()?);
        assert!(config.token.validate("abc"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_root_is_an_error() -> TestResult {
        let tmp = TempDir::new()?;
        let err = args(&tmp.path().join("nope"))
            .into_config()
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::RootDir { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn file_root_is_an_error() -> TestResult {
        let tmp = TempDir::new()?;
        let file = tmp.path().join("file.csv");
        std::fs::write(&file, "a\n")?;

        let err = args(&file).into_config().await.unwrap_err();
        assert!(matches!(err, ConfigError::RootNotDirectory { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn host_names_and_bracketed_literals_resolve() -> TestResult {
        let addr = resolve_listen_addr("localhost", 8888).await?;
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8888);

        let addr = resolve_listen_addr("[::1]", 8080).await?;
        assert_eq!(addr, "[::1]:8080".parse()?);

        let addr = resolve_listen_addr("0.0.0.0", 80).await?;
        assert_eq!(addr, "0.0.0.0:80".parse()?);
        Ok(())
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_user(Path::new("~/data"));
        if let Some(home) = home_dir() {
            assert_eq!(expanded, home.join("data"));
        }
        assert_eq!(expand_user(Path::new("/srv/data")), PathBuf::from("/srv/data"));
    }
}
