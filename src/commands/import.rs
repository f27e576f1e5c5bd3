//! Import command handlers for CSV files
//!
//! Preview a file's header the same way the picker will sniff it, and load a
//! file into the running picker.

use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::file_parser::{FileParser, FileParserConfig};
use crate::core::file_source::PathFileSource;
use crate::core::models::{AppError, AppResult, HeaderPreview, IntakeKind};
use crate::utils::file_utils::is_supported_file;
use crate::AppState;

/// Preview the header and first rows of a CSV file
pub async fn preview_import_data(
    file_path: String,
    max_rows: Option<usize>,
) -> Result<HeaderPreview, String> {
    info!("👁️ Previewing import data: {}", file_path);

    match preview_import_data_impl(&file_path, max_rows).await {
        Ok(preview) => {
            info!(
                "✅ Generated preview with {} headers and {} rows",
                preview.headers.len(),
                preview.rows.len()
            );
            Ok(preview)
        }
        Err(e) => {
            error!("❌ Failed to preview import data: {}", e);
            Err(e.to_string())
        }
    }
}

async fn preview_import_data_impl(
    file_path: &str,
    max_rows: Option<usize>,
) -> AppResult<HeaderPreview> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(AppError::Parse(format!("File not found: {}", file_path)));
    }
    if !is_supported_file(file_path) {
        warn!("{} does not look like a CSV file, sniffing anyway", file_path);
    }

    let parser = FileParser::with_config(FileParserConfig {
        preview_rows: max_rows.unwrap_or(10),
        ..FileParserConfig::default()
    });
    parser.preview_file(path).await
}

/// Hand a file to the picker as if it was chosen in the browse dialog
pub async fn load_file(state: &AppState, file_path: String) -> Result<(), String> {
    info!("📁 Loading file into picker: {}", file_path);

    if !Path::new(&file_path).exists() {
        let message = format!("File not found: {}", file_path);
        error!("❌ {}", message);
        return Err(message);
    }

    let source = Arc::new(PathFileSource::new(&file_path));
    state
        .picker
        .offer_files(IntakeKind::Browse, vec![source])
        .await
        .map_err(|e| {
            error!("❌ Failed to load file: {}", e);
            e.to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_preview_missing_file() {
        let err = preview_import_data("/no/such/file.csv".to_string(), None)
            .await
            .unwrap_err();
        assert!(err.contains("File not found"));
    }

    #[tokio::test]
    async fn test_preview_limits_rows() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"city;zip\nParis;75001\nLyon;69001\n").unwrap();
        file.flush().unwrap();

        let preview = preview_import_data(file.path().to_string_lossy().into_owned(), Some(1))
            .await
            .unwrap();
        assert_eq!(preview.headers, vec!["city", "zip"]);
        assert_eq!(preview.rows.len(), 1);
        assert_eq!(preview.total_rows, 2);
    }
}
