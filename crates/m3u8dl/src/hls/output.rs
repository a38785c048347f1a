// Output sink: the single file every downloaded segment is appended to.

use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::DownloadError;

/// Write mode for the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    Truncate,
    Append,
}

impl WriteMode {
    pub fn from_append(append: bool) -> Self {
        if append { Self::Append } else { Self::Truncate }
    }
}

/// An open output file. Closing consumes the handle, so it happens once.
#[derive(Debug)]
pub struct OutputFile {
    path: PathBuf,
    file: File,
    bytes_written: u64,
}

impl OutputFile {
    /// Create parent directories and open `path` in `mode`.
    pub async fn open(path: impl Into<PathBuf>, mode: WriteMode) -> Result<Self, DownloadError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::file(&path, e))?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            WriteMode::Truncate => options.write(true).truncate(true),
            WriteMode::Append => options.append(true),
        };

        let file = options
            .open(&path)
            .await
            .map_err(|e| DownloadError::file(&path, e))?;
        debug!(path = %path.display(), ?mode, "Opened output file");

        Ok(Self {
            path,
            file,
            bytes_written: 0,
        })
    }

    /// Wrap an already open handle.
    #[cfg(test)]
    pub(crate) fn from_file(path: PathBuf, file: File) -> Self {
        Self {
            path,
            file,
            bytes_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written through this handle (not counting pre-existing content).
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.file.write_all(chunk).await?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Flush and release the handle, returning the path it was bound to.
    pub async fn close(mut self) -> std::io::Result<PathBuf> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        debug!(path = %self.path.display(), bytes = self.bytes_written, "Closed output file");
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/out.ts");

        let mut output = OutputFile::open(&path, WriteMode::Truncate).await.unwrap();
        output.write_chunk(b"abc").await.unwrap();
        assert_eq!(output.bytes_written(), 3);
        output.close().await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_truncate_and_append_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ts");
        tokio::fs::write(&path, b"old-content").await.unwrap();

        let mut output = OutputFile::open(&path, WriteMode::Truncate).await.unwrap();
        output.write_chunk(b"new").await.unwrap();
        output.close().await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"new");

        let mut output = OutputFile::open(&path, WriteMode::Append).await.unwrap();
        output.write_chunk(b"+more").await.unwrap();
        output.close().await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"new+more");
    }

    #[tokio::test]
    async fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        tokio::fs::write(&blocker, b"x").await.unwrap();

        let err = OutputFile::open(blocker.join("out.ts"), WriteMode::Truncate)
            .await
            .unwrap_err();
        assert!(err.is_file());
    }
}
