use super::types::FinderError;

/// Where an error sits in the recovery taxonomy of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A requested year or month folder does not exist.
    MissingPath,
    /// A single entry could not be read; only that entry is skipped.
    FileAccess,
    /// One manager x client task failed; the run continues without it.
    TaskFailure,
    /// One client's CSV/ZIP could not be written; other clients proceed.
    ExportFailure,
    /// The run cannot continue.
    Fatal,
}

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub kind: ErrorKind,
    pub recoverable: bool,
}

impl FinderError {
    /// Classify this error to determine how far its damage reaches.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            FinderError::Walk { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorClassification {
                    error_type: "MissingPath",
                    kind: ErrorKind::MissingPath,
                    recoverable: true,
                }
            }
            FinderError::Walk { .. } => ErrorClassification {
                error_type: "FileAccessError",
                kind: ErrorKind::FileAccess,
                recoverable: true,
            },
            FinderError::TaskFailed { .. } => ErrorClassification {
                error_type: "TaskFailure",
                kind: ErrorKind::TaskFailure,
                recoverable: true,
            },
            FinderError::Export { .. } | FinderError::Csv(_) | FinderError::Zip(_) => {
                ErrorClassification {
                    error_type: "ExportFailure",
                    kind: ErrorKind::ExportFailure,
                    recoverable: true,
                }
            }
            FinderError::BaseDirectory { .. } => ErrorClassification {
                error_type: "BaseDirectoryError",
                kind: ErrorKind::Fatal,
                recoverable: false,
            },
            FinderError::Config(_) | FinderError::Yaml(_) => ErrorClassification {
                error_type: "ConfigError",
                kind: ErrorKind::Fatal,
                recoverable: false,
            },
            FinderError::Regex(_) => ErrorClassification {
                error_type: "PatternError",
                kind: ErrorKind::Fatal,
                recoverable: false,
            },
            FinderError::Cancelled => ErrorClassification {
                error_type: "Cancelled",
                kind: ErrorKind::Fatal,
                recoverable: false,
            },
            FinderError::Io(_) => ErrorClassification {
                error_type: "IoError",
                kind: ErrorKind::Fatal,
                recoverable: false,
            },
            FinderError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                kind: ErrorKind::Fatal,
                recoverable: false,
            },
            FinderError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                kind: ErrorKind::Fatal,
                recoverable: false,
            },
        }
    }
}
