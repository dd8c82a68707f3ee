//! Error types for routing and dispatch.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Router-specific errors raised while building or loading a route table.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A method name outside the supported verb set.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The route manifest could not be read.
    #[error("failed to read route manifest {path}: {source}")]
    Io {
        /// Path of the manifest.
        path: std::path::PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The route manifest is not valid JSON or has the wrong shape.
    #[error("invalid route manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

/// A failure raised by a route handler.
///
/// Cheap to clone: the same value is handed to the error handler as an
/// argument and, when recovery is impossible, returned to the caller.
#[derive(Clone)]
pub struct HandlerError(Arc<dyn std::error::Error + Send + Sync>);

impl HandlerError {
    /// Wraps any error value.
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    /// Creates an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(Arc::new(Message(message.into())))
    }

    /// Returns true if both values point at the same underlying error.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerError").field(&self.0).finish()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

/// Dispatch outcomes that could not be recovered by an error route.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A handler failed and no error route could take over; the original
    /// failure is handed back unchanged.
    #[error(transparent)]
    Handler(HandlerError),

    /// No error route exists for the code and there is no failure to
    /// propagate. Request processing stops here.
    #[error("Router error {code}")]
    Terminated {
        /// The error code that could not be handled.
        code: u16,
    },
}

impl DispatchError {
    /// The propagated handler failure, if any.
    #[must_use]
    pub fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            Self::Handler(e) => Some(e),
            Self::Terminated { .. } => None,
        }
    }
}
