use derive_more::Display;
use thiserror::Error as ThisError;

///
/// Error
///
/// Structured runtime error with a stable internal classification.
/// Configuration-class errors are fatal and must surface at registration
/// time; everything else is a per-call failure.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl Error {
    /// Construct an Error with no structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a configuration error for a specific origin.
    pub(crate) fn config(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Config, origin, message)
    }

    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self.class, ErrorClass::Config)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`Error`].
/// Lets callers branch on recoverable per-call failures without string
/// matching.
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Serialize(SerializeError),
    #[error("{0}")]
    Script(crate::script::ScriptError),
}

///
/// SerializeError
///
/// A stored value could not be converted to or from its declared field
/// type. Always identifies the offending record key and field.
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("key '{key}': field '{field}' is missing")]
    MissingField { key: String, field: String },

    #[error("key '{key}': field '{field}' holds undecodable value '{raw}'")]
    BadValue {
        key: String,
        field: String,
        raw: String,
    },
}

impl SerializeError {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::MissingField { key, .. } | Self::BadValue { key, .. } => key,
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field, .. } | Self::BadValue { field, .. } => field,
        }
    }
}

impl From<SerializeError> for Error {
    fn from(err: SerializeError) -> Self {
        Self {
            class: ErrorClass::Serialize,
            origin: ErrorOrigin::Serialize,
            message: err.to_string(),
            detail: Some(ErrorDetail::Serialize(err)),
        }
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorClass {
    #[display("config")]
    Config,
    #[display("conflict")]
    Conflict,
    #[display("invariant_violation")]
    InvariantViolation,
    #[display("script")]
    Script,
    #[display("serialize")]
    Serialize,
    #[display("store")]
    Store,
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorOrigin {
    #[display("codec")]
    Codec,
    #[display("executor")]
    Executor,
    #[display("model")]
    Model,
    #[display("registry")]
    Registry,
    #[display("script")]
    Script,
    #[display("serialize")]
    Serialize,
    #[display("store")]
    Store,
}
