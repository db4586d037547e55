//! Error types for scanlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Field decoding failures are grouped under
//! [`DecodeError`] so callers can tell "the scanner sent (or the user typed)
//! something invalid" apart from transport trouble.

/// A field value could not be decoded or validated.
///
/// Every decode failure aborts the operation that raised it before any
/// in-memory state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The text could not be parsed as the field's scalar type.
    #[error("{field}: cannot parse {value:?} as {expected}")]
    Format {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A parsed integer lies outside its inclusive range.
    #[error("{field}: {value} is outside the range [{min}-{max}]")]
    Range {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// An enumerated field's code or name is not a member of its closed set.
    #[error("{field}: unknown code {value:?}")]
    UnknownCode { field: &'static str, value: String },

    /// A reply's leading code does not belong to the object importing it.
    #[error("reply code mismatch: expected {expected}, got {actual}")]
    CodeMismatch {
        expected: &'static str,
        actual: String,
    },

    /// A reply carried the wrong number of argument fields.
    #[error("{code}: expected {expected} field(s), got {actual}")]
    FieldCount {
        code: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// The error type for all scanlib operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field failed to decode or validate.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The operation is not offered by this data object's category
    /// (e.g. a write command for a read-only property).
    #[error("{code} does not support {operation}")]
    UnsupportedOperation {
        code: &'static str,
        operation: &'static str,
    },

    /// No data object is registered for this command code.
    #[error("unrecognized command: {0}")]
    UnrecognizedCommand(String),

    /// A configuration value was missing or out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A transport-level error (serial port, USB).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (`ERR` reply, rejected set, malformed line).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for a reply from the scanner.
    ///
    /// This typically indicates the scanner is powered off, the baud rate
    /// is wrong, or the wrong port was opened.
    #[error("timeout waiting for response")]
    Timeout,

    /// No connection to the scanner has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the scanner was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::UnsupportedOperation`].
    pub fn unsupported(code: &'static str, operation: &'static str) -> Self {
        Error::UnsupportedOperation { code, operation }
    }

    /// Returns the inner [`DecodeError`] if this is a decode failure.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Error::Decode(e) => Some(e),
            _ => None,
        }
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
