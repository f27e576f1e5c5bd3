//! File system utilities

use std::fs;
use std::io;
use std::path::Path;

/// Ensure directory exists
pub fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to create directory {}: {}", path.display(), e),
            )
        })?;
    }
    Ok(())
}

/// Get file extension
pub fn get_file_extension(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|ext| ext.to_str())
}

/// Whether a path looks like a CSV-ish text file the picker can sniff
pub fn is_supported_file(filename: &str) -> bool {
    matches!(
        get_file_extension(filename).map(|ext| ext.to_ascii_lowercase()),
        Some(ref ext) if ext == "csv" || ext == "txt" || ext == "tsv"
    )
}
