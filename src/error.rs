//! Error types for schema compilation and event instantiation.

use thiserror::Error;

/// Result type for dee-schema operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller asked for something that was never configured (unknown
    /// template, unmapped or unknown event type).
    Configuration,
    /// The trigger-spec text does not have the expected structure.
    MalformedSpec,
    /// A schema with zero fields was used to build an event instance.
    DegenerateSchema,
    /// A schema definition violates its own invariants.
    InvalidSchema,
    /// IO or serialization failure around the core (CLI only).
    Io,
}

/// Error type for dee-schema operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Requested template name is not registered.
    #[error("unknown schema template '{name}' (available: {available})")]
    UnknownTemplate { name: String, available: String },

    /// Event type found in the trigger spec has no identifier in the mapping.
    #[error("event type '{event_type}' has no identifier in the event type mapping")]
    UnmappedEventType { event_type: String },

    /// Event type is not part of the schema catalog.
    #[error("event type '{event_type}' is not defined in the schema catalog")]
    UnknownEventType { event_type: String },

    /// Structural problem in the trigger-spec text.
    #[error("malformed trigger spec at line {line}: {reason}")]
    MalformedSpec { line: usize, reason: String },

    /// Schema has no fields; the non-empty ratio would be undefined.
    #[error("schema '{schema}' has no fields")]
    DegenerateSchema { schema: String },

    /// Key field is not one of the schema's fields.
    #[error("key field '{field}' is not a field of schema '{schema}'")]
    UnknownKeyField { schema: String, field: String },

    /// Field listed more than once.
    #[error("field '{field}' appears more than once in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed-spec error at a 1-based `line`.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedSpec { line, reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownTemplate { .. } | Error::UnmappedEventType { .. } | Error::UnknownEventType { .. } => {
                ErrorKind::Configuration
            }
            Error::MalformedSpec { .. } => ErrorKind::MalformedSpec,
            Error::DegenerateSchema { .. } => ErrorKind::DegenerateSchema,
            Error::UnknownKeyField { .. } | Error::DuplicateField { .. } => ErrorKind::InvalidSchema,
            Error::Io(_) | Error::Json(_) => ErrorKind::Io,
        }
    }

    /// True for errors caused by caller configuration rather than input text.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
