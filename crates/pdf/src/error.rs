use thiserror::Error;

/// Document-level failures. Any of these ends a statement parse with
/// `success = false`; row-level problems never surface here.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("The PDF file is corrupt or unreadable: {0}")]
    Corrupt(String),
    #[error("The PDF is password protected")]
    Protected,
    #[error("Text extraction failed: {0}")]
    Renderer(String),
    #[error("Statement parsing was cancelled")]
    Cancelled,
    #[error("Invalid bank pattern '{pattern}': {source}")]
    BankPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
