//! File format registry.
//!
//! Every supported on-disk format is a variant of [`FileFormat`]. A format is
//! resolved either from an explicit token (`"csv"`, `"parquet"`, ...) or from
//! the extension of a file name. Matching is case-insensitive and a leading dot
//! is ignored, so `".CSV"`, `"csv"` and `"Csv"` all resolve to
//! [`FileFormat::Csv`].
//!
//! Each format advertises its [`Capabilities`]: whether a table can be read
//! from it and whether a table can be written to it. The format-specific write
//! code lives in the submodules of this module; readers are bound to the query
//! engine and live in `arbalister-datafusion`.
//!
//! Resolution fails closed: an unknown token or extension is an error, and so
//! is a format whose support was compiled out of this build (for example ORC
//! without the `orc` feature).

pub mod csv;
pub mod ipc;
pub mod jsonl;
pub mod orc;
pub mod parquet;

use std::{fmt, path::Path, str::FromStr};

use snafu::prelude::*;

/// Result alias for format resolution.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors produced while resolving a file format.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum FormatError {
    /// The token or extension does not name any known format.
    #[snafu(display("Unknown file format '{token}'"))]
    UnknownFormat {
        /// The offending token, as given by the caller.
        token: String,
    },

    /// The path has no extension and no explicit format was given.
    #[snafu(display("Cannot infer a file format for {path}: the file has no extension"))]
    MissingExtension {
        /// Path that was inspected.
        path: String,
    },

    /// The format is known but its support is not compiled into this build.
    #[snafu(display("File format '{format}' is not enabled in this build"))]
    FormatDisabled {
        /// Format that was requested.
        format: FileFormat,
    },

    /// The format exists but does not support the requested operation.
    #[snafu(display("File format '{format}' does not support {operation}"))]
    Unsupported {
        /// Format that was requested.
        format: FileFormat,
        /// Operation that is missing (`"reading"` or `"writing"`).
        operation: &'static str,
    },
}

/// What a format can do in this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// A table can be loaded from a file of this format.
    pub read: bool,
    /// A table can be written to a file of this format.
    pub write: bool,
}

impl Capabilities {
    /// Whether the format can be used for anything at all.
    pub fn any(self) -> bool {
        self.read || self.write
    }
}

/// Supported on-disk file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Apache Parquet.
    Parquet,
    /// Arrow IPC file format (a.k.a. Feather v2).
    Ipc,
    /// Newline-delimited JSON, one object per row.
    Jsonl,
    /// Apache Avro object container files (read only).
    Avro,
    /// Apache ORC (requires the `orc` feature).
    Orc,
}

impl FileFormat {
    /// All formats known to the registry, whether enabled or not.
    pub const ALL: [FileFormat; 6] = [
        FileFormat::Csv,
        FileFormat::Parquet,
        FileFormat::Ipc,
        FileFormat::Jsonl,
        FileFormat::Avro,
        FileFormat::Orc,
    ];

    /// Formats that have at least one capability in this build.
    pub fn enabled() -> impl Iterator<Item = FileFormat> {
        Self::ALL.into_iter().filter(|f| f.capabilities().any())
    }

    /// Canonical lowercase token.
    pub fn name(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
            FileFormat::Ipc => "ipc",
            FileFormat::Jsonl => "jsonl",
            FileFormat::Avro => "avro",
            FileFormat::Orc => "orc",
        }
    }

    /// Extensions (without dot) mapped to this format. The first one is the
    /// canonical extension.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileFormat::Csv => &["csv"],
            FileFormat::Parquet => &["parquet", "pq"],
            FileFormat::Ipc => &["arrow", "feather", "ipc"],
            FileFormat::Jsonl => &["jsonl", "ndjson"],
            FileFormat::Avro => &["avro"],
            FileFormat::Orc => &["orc"],
        }
    }

    /// Media type of a file in this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv",
            FileFormat::Parquet => "application/vnd.apache.parquet",
            FileFormat::Ipc => "application/vnd.apache.arrow.file",
            FileFormat::Jsonl => "application/x-ndjson",
            FileFormat::Avro => "application/avro-binary",
            FileFormat::Orc => "application/octet-stream",
        }
    }

    /// Read/write support of this format in this build.
    pub fn capabilities(self) -> Capabilities {
        match self {
            FileFormat::Csv | FileFormat::Parquet | FileFormat::Ipc | FileFormat::Jsonl => {
                Capabilities {
                    read: true,
                    write: true,
                }
            }
            FileFormat::Avro => Capabilities {
                read: true,
                write: false,
            },
            FileFormat::Orc => Capabilities {
                read: orc::ENABLED,
                write: orc::ENABLED,
            },
        }
    }

    /// Resolve a format from a token such as `"parquet"` or `".FEATHER"`.
    ///
    /// Both canonical names and every registered extension are accepted.
    pub fn from_token(token: &str) -> FormatResult<FileFormat> {
        let normalized = token.trim().trim_start_matches('.').to_ascii_lowercase();

        let format = Self::ALL
            .into_iter()
            .find(|f| f.name() == normalized || f.extensions().contains(&normalized.as_str()))
            .context(UnknownFormatSnafu {
                token: token.to_string(),
            })?;

        ensure!(format.capabilities().any(), FormatDisabledSnafu { format });
        Ok(format)
    }

    /// Resolve a format from the extension of `path`.
    pub fn from_path(path: &Path) -> FormatResult<FileFormat> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy())
            .filter(|e| !e.is_empty())
            .context(MissingExtensionSnafu {
                path: path.display().to_string(),
            })?;

        Self::from_token(&ext)
    }

    /// Resolve the format of `path`, letting an explicit token win over the
    /// extension.
    pub fn resolve(path: &Path, explicit: Option<&str>) -> FormatResult<FileFormat> {
        match explicit {
            Some(token) => Self::from_token(token),
            None => Self::from_path(path),
        }
    }

    /// Fail with [`FormatError::Unsupported`] unless the format can be read.
    pub fn ensure_readable(self) -> FormatResult<()> {
        ensure!(
            self.capabilities().read,
            UnsupportedSnafu {
                format: self,
                operation: "reading",
            }
        );
        Ok(())
    }

    /// Fail with [`FormatError::Unsupported`] unless the format can be written.
    pub fn ensure_writable(self) -> FormatResult<()> {
        ensure!(
            self.capabilities().write,
            UnsupportedSnafu {
                format: self,
                operation: "writing",
            }
        );
        Ok(())
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileFormat::from_token(s)
    }
}
