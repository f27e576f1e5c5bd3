//! File sources feeding the picker
//!
//! A source is read twice over its lifetime: once to sniff headers when it is
//! selected, and again to attach its raw bytes when the user submits.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::core::models::AppResult;

/// Something the picker can read a CSV file from
#[async_trait]
pub trait FileSource: Send + Sync + fmt::Debug {
    /// File name used when uploading
    fn name(&self) -> &str;

    async fn read_bytes(&self) -> AppResult<Vec<u8>>;
}

/// Shared handle to a file source
pub type SharedFileSource = Arc<dyn FileSource>;

/// File on the local filesystem
#[derive(Debug, Clone)]
pub struct PathFileSource {
    path: PathBuf,
    name: String,
}

impl PathFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data.csv".to_string());
        Self { path, name }
    }
}

#[async_trait]
impl FileSource for PathFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_bytes(&self) -> AppResult<Vec<u8>> {
        debug!("Reading {}", self.path.display());
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// File content already held in memory, e.g. dropped from another window
#[derive(Clone)]
pub struct MemoryFileSource {
    name: String,
    data: Bytes,
}

impl MemoryFileSource {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

impl fmt::Debug for MemoryFileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFileSource")
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

#[async_trait]
impl FileSource for MemoryFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_bytes(&self) -> AppResult<Vec<u8>> {
        Ok(self.data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_memory_source_reads_back() {
        let source = MemoryFileSource::new("people.csv", "a,b\n1,2\n");
        let data = tokio_test::block_on(source.read_bytes()).unwrap();
        assert_eq!(data, b"a,b\n1,2\n");
        assert_eq!(source.name(), "people.csv");
    }

    #[tokio::test]
    async fn test_path_source_uses_file_name() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"city;zip\n").unwrap();
        file.flush().unwrap();

        let source = PathFileSource::new(file.path());
        assert_eq!(
            source.name(),
            file.path().file_name().unwrap().to_string_lossy()
        );
        assert_eq!(source.read_bytes().await.unwrap(), b"city;zip\n");
    }

    #[tokio::test]
    async fn test_missing_path_is_io_error() {
        let source = PathFileSource::new("/definitely/not/here.csv");
        let err = source.read_bytes().await.unwrap_err();
        assert!(matches!(err, crate::core::models::AppError::Io(_)));
    }
}
