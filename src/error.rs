use std::error::Error as StdError;

use thiserror::Error;

use crate::types::SheetSelector;

/// Convenience result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Error raised from inside a caller-supplied handler.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

/// Result type returned by handler consumption methods.
pub type HandlerResult = Result<(), HandlerError>;

/// Error type returned by streaming and import functions.
///
/// This is a single error enum shared by the row stream, the formatter registry, the grid sources
/// and the import dispatcher.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Malformed row/column bounds (start row below 1, end row before start row, bad column ref).
    #[error("invalid range (start_row={start_row}, end_row={end_row:?}): {message}")]
    InvalidRange {
        start_row: usize,
        end_row: Option<usize>,
        message: String,
    },

    /// A sheet selector resolved to no sheet in the workbook.
    #[error("sheet {sheet} not found in the workbook")]
    SheetNotFound { sheet: SheetSelector },

    /// A heading formatter was requested by name but is not registered.
    #[error("heading formatter '{name}' was not found")]
    FormatterNotFound { name: String },

    /// No formatter name was given and the registry has no default.
    #[error("no heading formatter name given and no default formatter is configured")]
    NoDefaultFormatter,

    /// A chunked handler declared a chunk size of zero.
    #[error("chunk size must be greater than zero (got {size})")]
    InvalidChunkSize { size: usize },

    /// A caller-supplied handler failed while consuming records.
    #[error("handler failed: {0}")]
    Handler(#[source] HandlerError),

    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV source error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Workbook source error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),
}

impl ImportError {
    /// Wrap any handler-side error as [`ImportError::Handler`].
    pub fn handler(err: impl Into<HandlerError>) -> Self {
        Self::Handler(err.into())
    }

    /// Whether this failure may be contained at the sheet boundary when the run is not configured
    /// to throw on error.
    ///
    /// Configuration and range problems are never recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ImportError::Handler(_) | ImportError::Io(_) | ImportError::Csv(_) => true,
            #[cfg(feature = "excel")]
            ImportError::Excel(_) => true,
            ImportError::InvalidRange { .. }
            | ImportError::SheetNotFound { .. }
            | ImportError::FormatterNotFound { .. }
            | ImportError::NoDefaultFormatter
            | ImportError::InvalidChunkSize { .. } => false,
        }
    }

    /// Severity used when logging this error.
    pub fn severity(&self) -> ImportSeverity {
        match self {
            ImportError::Io(_) => ImportSeverity::Critical,
            ImportError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => ImportSeverity::Critical,
                _ => ImportSeverity::Error,
            },
            #[cfg(feature = "excel")]
            ImportError::Excel(err) => {
                if error_chain_contains_io(err) {
                    ImportSeverity::Critical
                } else {
                    ImportSeverity::Error
                }
            }
            ImportError::Handler(_) => ImportSeverity::Error,
            ImportError::SheetNotFound { .. } => ImportSeverity::Warning,
            ImportError::InvalidRange { .. }
            | ImportError::FormatterNotFound { .. }
            | ImportError::NoDefaultFormatter
            | ImportError::InvalidChunkSize { .. } => ImportSeverity::Error,
        }
    }
}

/// Severity classification for import failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
