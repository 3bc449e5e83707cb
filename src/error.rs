// ⚠️ Error taxonomy for extraction runs
// Fatal errors end a run; page and orphan problems are warnings (see summary.rs)

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned to the caller of an extraction or export.
///
/// Export failures are kept apart from extraction failures so a caller can retry
/// the export without re-running the extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The document could not be opened or decoded at all. No partial result exists.
    #[error("document unreadable: {name}: {reason}")]
    DocumentUnreadable { name: String, reason: String },

    /// The in-memory result is valid but could not be written to `path`.
    #[error("export write failed for {}: {reason}", path.display())]
    ExportWriteFailed { path: PathBuf, reason: String },

    /// A previously written export could not be read back.
    #[error("export read failed for {}: {reason}", path.display())]
    ExportReadFailed { path: PathBuf, reason: String },
}

impl ExtractionError {
    pub fn unreadable(name: impl Into<String>, reason: impl ToString) -> Self {
        ExtractionError::DocumentUnreadable {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ExtractionError::ExportWriteFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn read_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ExtractionError::ExportReadFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// A single page that failed to yield text or tables.
///
/// Non-fatal: the pipeline records it as a warning and continues with the next page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page {page_index} could not be read: {reason}")]
pub struct PageReadError {
    pub page_index: usize,
    pub reason: String,
}

impl PageReadError {
    pub fn new(page_index: usize, reason: impl ToString) -> Self {
        PageReadError {
            page_index,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_message_names_document() {
        let err = ExtractionError::unreadable("register.pdf", "not a PDF");
        assert_eq!(err.to_string(), "document unreadable: register.pdf: not a PDF");
    }

    #[test]
    fn test_write_failed_message_names_path() {
        let err = ExtractionError::write_failed("/nope/out.json", "permission denied");
        assert!(err.to_string().contains("/nope/out.json"));
        assert!(matches!(err, ExtractionError::ExportWriteFailed { .. }));
    }

    #[test]
    fn test_page_read_error_display() {
        let err = PageReadError::new(4, "bad content stream");
        assert_eq!(err.to_string(), "page 4 could not be read: bad content stream");
    }
}
