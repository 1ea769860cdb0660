//! Mapping request paths onto files under the server root.

use std::io;
use std::path::{Component, Path, PathBuf};

use snafu::prelude::*;
use tokio::fs;

/// Errors produced while resolving a request path.
#[derive(Debug, Snafu)]
pub enum PathError {
    /// The path points outside the server root.
    #[snafu(display("Path escapes the server root: {path}"))]
    OutsideRoot {
        /// Requested path, as received.
        path: String,
    },

    /// The resolved path could not be canonicalized.
    #[snafu(display("Failed to resolve {path}: {source}"))]
    Canonicalize {
        /// Joined path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Join the URL path `requested` onto `root` and make sure the result stays
/// under `root`.
///
/// `root` must be canonical. `..` components are applied lexically and may
/// not climb above `root`; an existing target is then canonicalized so that
/// symlinks pointing out of `root` are rejected too. A missing target is
/// returned as-is and reported by the reader.
pub async fn resolve_data_file(root: &Path, requested: &str) -> Result<PathBuf, PathError> {
    let outside = || {
        OutsideRootSnafu {
            path: requested.to_string(),
        }
        .build()
    };

    let mut joined = root.to_path_buf();
    for component in Path::new(requested.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if joined == root {
                    return Err(outside());
                }
                joined.pop();
            }
            Component::RootDir | Component::Prefix(_) => return Err(outside()),
        }
    }

    match fs::canonicalize(&joined).await {
        Ok(real) if real.starts_with(root) => Ok(real),
        Ok(_) => Err(outside()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(joined),
        Err(e) => Err(e).context(CanonicalizeSnafu {
            path: joined.display().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn canonical_root(tmp: &TempDir) -> io::Result<PathBuf> {
        std::fs::canonicalize(tmp.path())
    }

    #[tokio::test]
    async fn joins_nested_paths() -> TestResult {
        let tmp = TempDir::new()?;
        let root = canonical_root(&tmp)?;
        std::fs::create_dir_all(root.join("a/b"))?;
        std::fs::write(root.join("a/b/data.csv"), "x\n1\n")?;

        let resolved = resolve_data_file(&root, "a/./b/data.csv").await?;
        assert_eq!(resolved, root.join("a/b/data.csv"));
        Ok(())
    }

    #[tokio::test]
    async fn leading_slash_stays_under_root() -> TestResult {
        let tmp = TempDir::new()?;
        let root = canonical_root(&tmp)?;

        let resolved = resolve_data_file(&root, "/etc/passwd").await?;
        assert_eq!(resolved, root.join("etc/passwd"));
        Ok(())
    }

    #[tokio::test]
    async fn parent_dir_inside_root_is_allowed() -> TestResult {
        let tmp = TempDir::new()?;
        let root = canonical_root(&tmp)?;

        let resolved = resolve_data_file(&root, "a/../b.csv").await?;
        assert_eq!(resolved, root.join("b.csv"));
        Ok(())
    }

    #[tokio::test]
    async fn climbing_above_root_is_rejected() -> TestResult {
        let tmp = TempDir::new()?;
        let root = canonical_root(&tmp)?;

        let err = resolve_data_file(&root, "../outside.csv").await.unwrap_err();
        assert!(matches!(err, PathError::OutsideRoot { .. }));

        let err = resolve_data_file(&root, "a/../../outside.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, PathError::OutsideRoot { .. }));
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_out_of_root_is_rejected() -> TestResult {
        let outside = TempDir::new()?;
        std::fs::write(outside.path().join("secret.csv"), "x\n1\n")?;

        let tmp = TempDir::new()?;
        let root = canonical_root(&tmp)?;
        std::os::unix::fs::symlink(outside.path().join("secret.csv"), root.join("link.csv"))?;

        let err = resolve_data_file(&root, "link.csv").await.unwrap_err();
        assert!(matches!(err, PathError::OutsideRoot { .. }));
        Ok(())
    }
}
