//! Presentation of documents returned by the geocoding endpoint

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use crate::core::models::{AppResult, CsvDocument};
use crate::utils::file_utils::ensure_dir_exists;

/// Hands a received document to the user
#[async_trait]
pub trait DocumentPresenter: Send + Sync {
    /// Returns where the document can be opened, if it has a location
    async fn present(&self, document: &CsvDocument) -> AppResult<Option<String>>;
}

/// Writes documents into a directory under generated names
#[derive(Debug, Clone)]
pub struct FileDocumentPresenter {
    directory: PathBuf,
}

impl FileDocumentPresenter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, document: &CsvDocument) -> PathBuf {
        self.directory.join(format!("geocoded-{}.csv", document.id))
    }
}

#[async_trait]
impl DocumentPresenter for FileDocumentPresenter {
    async fn present(&self, document: &CsvDocument) -> AppResult<Option<String>> {
        ensure_dir_exists(&self.directory)?;
        let path = self.path_for(document);
        tokio::fs::write(&path, document.content.as_bytes()).await?;
        info!("💾 Saved {} bytes to {}", document.content.len(), path.display());
        Ok(Some(path.to_string_lossy().into_owned()))
    }
}

/// Keeps documents in memory only; used when the caller reads them from notifications
#[derive(Debug, Clone, Default)]
pub struct DetachedPresenter;

#[async_trait]
impl DocumentPresenter for DetachedPresenter {
    async fn present(&self, _document: &CsvDocument) -> AppResult<Option<String>> {
        Ok(None)
    }
}
