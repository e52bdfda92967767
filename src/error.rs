use thiserror::Error;

pub type Result<T> = std::result::Result<T, SvgError>;

/// How the parser reacts to constructs it does not recognize.
///
/// Only unknown elements and unknown style-property values are governed by the
/// mode. Malformed numbers, wrong argument counts and structural problems are
/// always returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Abort the parse and return the error.
    Strict,
    /// Log the condition, record it on the document and continue.
    #[default]
    Warn,
    /// Continue silently.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ParameterMismatch,
    MalformedValue,
    Structural,
    UnrecognizedElement,
    UnrecognizedStyleValue,
    NonInvertible,
    Subsystem,
    EmptyDocument,
    InvalidConfiguration,
}

#[derive(Error, Debug)]
pub enum SvgError {
    #[error("parameter mismatch: {0}")]
    ParameterMismatch(String),

    #[error("malformed value: {0}")]
    MalformedValue(String),

    #[error("structural error: {0}")]
    Structural(String),

    #[error("cannot process svg element <{0}>")]
    UnrecognizedElement(String),

    #[error("unsupported value '{value}' for <{property}>")]
    UnrecognizedStyleValue { property: String, value: String },

    #[error("matrix is not invertible")]
    NonInvertible,

    #[error("xml error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid svg: input contains no elements")]
    EmptyDocument,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SvgError {
    pub(crate) fn malformed(what: impl Into<String>) -> Self {
        SvgError::MalformedValue(what.into())
    }

    pub(crate) fn mismatch(what: impl Into<String>) -> Self {
        SvgError::ParameterMismatch(what.into())
    }

    pub(crate) fn structural(what: impl Into<String>) -> Self {
        SvgError::Structural(what.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SvgError::ParameterMismatch(_) => ErrorKind::ParameterMismatch,
            SvgError::MalformedValue(_) => ErrorKind::MalformedValue,
            SvgError::Structural(_) => ErrorKind::Structural,
            SvgError::UnrecognizedElement(_) => ErrorKind::UnrecognizedElement,
            SvgError::UnrecognizedStyleValue { .. } => ErrorKind::UnrecognizedStyleValue,
            SvgError::NonInvertible => ErrorKind::NonInvertible,
            SvgError::Xml(_) | SvgError::Io(_) => ErrorKind::Subsystem,
            SvgError::EmptyDocument => ErrorKind::EmptyDocument,
            SvgError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
        }
    }

    /// True for errors that abort the parse regardless of [`ErrorMode`].
    pub fn is_always_fatal(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::UnrecognizedElement | ErrorKind::UnrecognizedStyleValue
        )
    }
}
