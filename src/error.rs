use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the I/O-bound parts of the crate (run log, options files).
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error during {op}: {reason}")]
    Storage { op: &'static str, reason: String },
}

impl Error {
    pub fn storage(op: &'static str, reason: impl Into<String>) -> Self {
        Error::Storage {
            op,
            reason: reason.into(),
        }
    }
}

/// Errors returned by the batch executor.
///
/// `E` is the error type of the operation being run. In all-or-fail mode the
/// first failing invocation is handed back untouched inside [`BatchError::Operation`].
#[derive(Debug, Error)]
pub enum BatchError<E> {
    #[error("invalid argument `{param}`: {reason}")]
    InvalidArgument { param: &'static str, reason: String },

    #[error("{0}")]
    Operation(E),
}

impl<E> BatchError<E> {
    pub(crate) fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        BatchError::InvalidArgument {
            param,
            reason: reason.into(),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, BatchError::InvalidArgument { .. })
    }

    /// The operation's own error, if the run was aborted by one.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            BatchError::Operation(e) => Some(e),
            BatchError::InvalidArgument { .. } => None,
        }
    }
}
