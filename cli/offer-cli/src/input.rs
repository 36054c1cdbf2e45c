use std::path::Path;
use tracing::debug;

use crate::error::{OfferError, Result};

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Content type implied by a file extension.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(CSV_CONTENT_TYPE),
        "txt" => Some("text/plain"),
        "json" => Some("application/json"),
        "tsv" => Some("text/tab-separated-values"),
        _ => None,
    }
}

/// Reads an offer file to completion.
///
/// `declared_type` overrides the type derived from the extension. Anything
/// other than `text/csv` is rejected before the file is opened.
pub async fn read_offer_file(path: &Path, declared_type: Option<&str>) -> Result<String> {
    let content_type = declared_type
        .map(str::to_owned)
        .or_else(|| content_type_for(path).map(str::to_owned))
        .unwrap_or_else(|| "application/octet-stream".to_owned());
    if content_type != CSV_CONTENT_TYPE {
        return Err(OfferError::UnsupportedFileType(content_type));
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| OfferError::UnreadableFile(format!("{}: {}", path.display(), e)))?;
    if text.trim().is_empty() {
        return Err(OfferError::UnreadableFile(format!(
            "{}: file is empty",
            path.display()
        )));
    }
    debug!(path = %path.display(), bytes = text.len(), "Read offer file");
    Ok(text)
}

/// Splits semicolon-delimited text into trimmed cells, dropping the header
/// line and any blank lines.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    text.trim()
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(';').map(|cell| cell.trim().to_string()).collect())
        .collect()
}
