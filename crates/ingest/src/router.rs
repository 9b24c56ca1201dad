use std::path::Path;

use thiserror::Error;

use spendlens_core::Transaction;

use crate::csv::CsvError;
use crate::pdf::PdfError;

/// Files larger than this are rejected before any parsing begins.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file type: .{0}")]
    UnsupportedFileType(String),
    #[error("File too large ({size} bytes; max {max} bytes)")]
    FileTooLarge { size: usize, max: usize },
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Dispatch file content to the matching parser by extension, unifying both
/// paths into one transaction shape. The size cap and the extension check
/// both happen before any parsing work.
pub fn parse_bytes(file_name: &str, bytes: &[u8]) -> Result<Vec<Transaction>, IngestError> {
    if bytes.len() > MAX_FILE_BYTES {
        return Err(IngestError::FileTooLarge { size: bytes.len(), max: MAX_FILE_BYTES });
    }

    let ext = file_name.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "csv" => {
            let text = String::from_utf8_lossy(bytes);
            Ok(crate::csv::parse(&text)?)
        }
        "pdf" => Ok(crate::pdf::parse(bytes)?),
        other => Err(IngestError::UnsupportedFileType(other.to_string())),
    }
}

/// Read and parse a file on disk.
pub async fn parse_file(path: &Path) -> Result<Vec<Transaction>, IngestError> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    tracing::info!(file = %path.display(), size = bytes.len(), "ingesting");
    parse_bytes(name, &bytes)
}
