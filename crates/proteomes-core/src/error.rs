//! Error types for proteomes-core

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for proteomes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying or writing the peptiform index.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A caller-supplied argument was rejected before any query was issued.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Argument or field that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// The underlying index could not serve the request.
    #[error("Index unavailable: {message}")]
    IndexUnavailable {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A document violates a model invariant at the write boundary.
    #[error("Inconsistent document '{id}': {message}")]
    InconsistentDocument {
        /// Id of the offending document
        id: String,
        /// Which invariant was violated
        message: String,
    },

    /// A requested resource does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Identifier that was looked up
        id: String,
        /// Kind of resource (e.g. "index directory")
        kind: String,
    },

    /// I/O error tied to a filesystem path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

impl Error {
    /// Returns whether retrying the same request could succeed.
    ///
    /// Only index availability and I/O failures are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::IndexUnavailable { .. } => true,
            Error::Io { .. } => true,
            Error::InvalidArgument { .. } => false,
            Error::InconsistentDocument { .. } => false,
            Error::NotFound { .. } => false,
            Error::Config { .. } => false,
        }
    }

    /// Returns `true` for argument validation failures.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. })
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument {
            field: None,
            message: message.into(),
        }
    }

    /// Creates an invalid argument error naming the offending field.
    pub fn invalid_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::InvalidArgument {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates an index unavailable error.
    pub fn index_unavailable<S: Into<String>>(message: S) -> Self {
        Error::IndexUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an index unavailable error wrapping the backend's error.
    pub fn index_unavailable_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::IndexUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an inconsistent document error.
    pub fn inconsistent<I, M>(id: I, message: M) -> Self
    where
        I: Into<String>,
        M: Into<String>,
    {
        Error::InconsistentDocument {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found<I, K>(id: I, kind: K) -> Self
    where
        I: Into<String>,
        K: Into<String>,
    {
        Error::NotFound {
            id: id.into(),
            kind: kind.into(),
        }
    }

    /// Wraps an I/O error with the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
