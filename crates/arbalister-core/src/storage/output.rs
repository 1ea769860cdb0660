use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use snafu::ResultExt;
use tokio::fs;

use crate::storage::{
    OtherIoSnafu, StorageResult, TempFileGuard, create_parent_dir, temp_path_for,
};

/// Local filesystem sink that writes to a temp file and renames on finish.
struct LocalSink {
    tmp_path: PathBuf,
    final_path: PathBuf,
    writer: io::BufWriter<std::fs::File>,
    guard: TempFileGuard,
}

impl LocalSink {
    async fn open(final_path: &Path) -> StorageResult<Self> {
        let final_path = final_path.to_path_buf();
        create_parent_dir(&final_path).await?;

        let tmp_path = temp_path_for(&final_path);

        // Arrow and Parquet writers require std::io::Write.
        let file = std::fs::File::create(&tmp_path)
            .context(OtherIoSnafu {
                path: tmp_path.display().to_string(),
            })?;

        let writer = io::BufWriter::new(file);
        let guard = TempFileGuard::new(tmp_path.clone());

        Ok(Self {
            tmp_path,
            final_path,
            writer,
            guard,
        })
    }

    fn writer(&mut self) -> &mut (dyn Write + Send) {
        &mut self.writer
    }

    async fn finish(&mut self) -> StorageResult<()> {
        self.writer
            .flush()
            .context(OtherIoSnafu {
                path: self.tmp_path.display().to_string(),
            })?;

        self.writer
            .get_ref()
            .sync_all()
            .context(OtherIoSnafu {
                path: self.tmp_path.display().to_string(),
            })?;

        fs::rename(&self.tmp_path, &self.final_path)
            .await
            .context(OtherIoSnafu {
                path: self.final_path.display().to_string(),
            })?;

        self.guard.disarm();
        Ok(())
    }
}

/// A streaming output sink for writing one output file.
///
/// Callers obtain a sink via [`open_output_sink`], stream bytes through
/// [`OutputSink::writer`] and commit with [`OutputSink::finish`]. Dropping a
/// sink without finishing discards everything written to it.
pub struct OutputSink {
    inner: LocalSink,
}

impl OutputSink {
    /// Mutable `Write` handle for streaming bytes.
    pub fn writer(&mut self) -> &mut (dyn Write + Send) {
        self.inner.writer()
    }

    /// Destination the sink commits to.
    pub fn path(&self) -> &Path {
        &self.inner.final_path
    }

    /// Flush, fsync and move the file into its final location.
    pub async fn finish(mut self) -> StorageResult<()> {
        self.inner.finish().await
    }
}

/// Open a streaming output sink for `path`, creating missing parent
/// directories.
pub async fn open_output_sink(path: &Path) -> StorageResult<OutputSink> {
    let sink = LocalSink::open(path).await?;
    Ok(OutputSink { inner: sink })
}
