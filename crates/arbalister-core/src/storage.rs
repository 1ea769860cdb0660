//! Local filesystem helpers for writing output files.
//!
//! Output files are never written in place: bytes go to a temporary sibling
//! file which is renamed onto the destination once the writer has finished.
//! A failed or abandoned write therefore leaves no truncated destination file
//! behind, and the temporary file is removed on drop.

mod output;

pub use output::{OutputSink, open_output_sink};

use snafu::{Backtrace, prelude::*};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// General result type used by storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    /// The parent directory of the destination could not be created.
    #[snafu(display("Failed to create directory {path}: {source}"))]
    CreateDir {
        /// Directory that could not be created.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// An I/O error occurred on the local filesystem.
    #[snafu(display("Local I/O error at {path}: {source}"))]
    OtherIo {
        /// The path where the I/O error occurred.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },
}

/// Create every missing parent directory of `abs`.
pub(crate) async fn create_parent_dir(abs: &Path) -> StorageResult<()> {
    if let Some(parent) = abs.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .context(CreateDirSnafu {
                path: parent.display().to_string(),
            })?;
    }
    Ok(())
}

/// Temporary path next to `final_path`, keeping the full file name so that
/// `a.csv` and `a.parquet` never share a temp file.
pub(crate) fn temp_path_for(final_path: &Path) -> PathBuf {
    let mut name = final_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    final_path.with_file_name(name)
}

/// Guard that removes a temporary file on drop unless disarmed.
pub(crate) struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Keep the file. Call after a successful rename.
    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            // Best effort; the caller is already handling another error.
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn temp_path_keeps_extension() {
        let tmp = temp_path_for(Path::new("out/data.csv"));
        assert_eq!(tmp, PathBuf::from("out/data.csv.tmp"));
    }

    #[tokio::test]
    async fn create_parent_dir_builds_nested_dirs() -> TestResult {
        let tmp = TempDir::new()?;
        let target = tmp.path().join("a/b/c/file.parquet");

        create_parent_dir(&target).await?;
        assert!(tmp.path().join("a/b/c").is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn create_parent_dir_accepts_bare_file_name() -> TestResult {
        create_parent_dir(Path::new("file.csv")).await?;
        Ok(())
    }

    #[tokio::test]
    async fn create_dir_failure_carries_the_io_error() -> TestResult {
        let tmp = TempDir::new()?;
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x")?;

        let err = create_parent_dir(&blocker.join("out.csv"))
            .await
            .unwrap_err();
        let StorageError::CreateDir { path, .. } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(path, &blocker.display().to_string());
        assert!(std::error::Error::source(&err)
            .is_some_and(|s| s.downcast_ref::<io::Error>().is_some()));
        Ok(())
    }

    #[test]
    fn guard_removes_file_unless_disarmed() -> TestResult {
        let tmp = TempDir::new()?;
        let removed = tmp.path().join("removed.tmp");
        let kept = tmp.path().join("kept.tmp");
        std::fs::write(&removed, b"x")?;
        std::fs::write(&kept, b"x")?;

        drop(TempFileGuard::new(removed.clone()));
        let mut guard = TempFileGuard::new(kept.clone());
        guard.disarm();
        drop(guard);

        assert!(!removed.exists());
        assert!(kept.exists());
        Ok(())
    }
}
