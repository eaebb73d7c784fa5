use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for storage operations.
///
/// Each kind names one category of failure so callers can decide whether to
/// surface the error, retry, or treat it as a client mistake.
///
/// # Examples
///
/// ```rust,ignore
/// use deskstore::errors::{StoreError, ErrorKind, StoreResult};
///
/// fn example() -> StoreResult<()> {
///     Err(StoreError::new("Unknown query operator $near", ErrorKind::FilterError))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Query construction
    /// The query document or predicate is malformed
    FilterError,
    /// The update document or operator is malformed
    UpdateError,

    // Identity
    /// The supplied `id` is not usable as a document identifier
    InvalidId,
    /// A document with the same `id` already exists in the collection
    UniqueConstraintViolation,

    // Validation
    /// Generic validation error (collection names, document keys)
    ValidationError,
    /// An operator was applied to a value of the wrong type
    InvalidDataType,

    // Backend
    /// The live backend could not be reached or rejected the connection
    BackendUnavailable,
    /// The backend failed while executing an operation
    BackendError,
    /// The store has been closed
    StoreClosed,

    // Configuration and encoding
    /// Invalid configuration value
    ConfigError,
    /// Error converting data to or from its wire representation
    EncodingError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::UpdateError => write!(f, "Update error"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::UniqueConstraintViolation => write!(f, "Unique constraint violation"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::InvalidDataType => write!(f, "Invalid data type"),
            ErrorKind::BackendUnavailable => write!(f, "Backend unavailable"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::StoreClosed => write!(f, "Store closed"),
            ErrorKind::ConfigError => write!(f, "Configuration error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type of the storage layer.
///
/// `StoreError` carries a message, an [ErrorKind], an optional cause and the
/// backtrace captured at construction.
///
/// Not-found conditions are never reported through this type: lookups return
/// `Option` and mutations return a zero count.
///
/// # Examples
///
/// ```rust,ignore
/// use deskstore::errors::{StoreError, ErrorKind};
///
/// let cause = StoreError::new("connection refused", ErrorKind::BackendUnavailable);
/// let err = StoreError::new_with_cause("Live backend probe failed", ErrorKind::BackendUnavailable, cause);
/// ```
#[derive(Clone)]
pub struct StoreError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<StoreError>>,
    backtrace: Arc<Backtrace>,
}

impl StoreError {
    /// Creates a new `StoreError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        StoreError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `StoreError` that keeps `cause` in its error chain.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: StoreError) -> Self {
        StoreError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&StoreError> {
        self.cause.as_deref()
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // message with stack trace, or the cause chain
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Shorthand for `Result<T, StoreError>`, returned by every fallible operation.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::new(&format!("JSON error: {}", err), ErrorKind::EncodingError)
    }
}

impl From<regex::Error> for StoreError {
    fn from(err: regex::Error) -> Self {
        StoreError::new(
            &format!("Invalid regular expression: {}", err),
            ErrorKind::FilterError,
        )
    }
}

impl From<std::num::ParseIntError> for StoreError {
    fn from(err: std::num::ParseIntError) -> Self {
        StoreError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::InvalidDataType,
        )
    }
}

impl From<std::num::ParseFloatError> for StoreError {
    fn from(err: std::num::ParseFloatError) -> Self {
        StoreError::new(
            &format!("Float parsing error: {}", err),
            ErrorKind::InvalidDataType,
        )
    }
}

impl From<String> for StoreError {
    fn from(msg: String) -> Self {
        StoreError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for StoreError {
    fn from(msg: &str) -> Self {
        StoreError::new(msg, ErrorKind::InternalError)
    }
}
