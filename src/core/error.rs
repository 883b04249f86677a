//! Error types and handling for Toy House
//!
//! A single error enum covers the whole request path. Store failures are
//! translated into it at the gateway boundary so that handlers only ever see
//! the taxonomy below, never a raw driver error.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Toy House
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// An id lookup matched no document
    #[error("Toy not found: {0}")]
    NotFound(String),

    /// Missing or malformed request input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Path segment is not a valid document identifier
    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// The document store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other failure reported by the document store
    #[error("Store error: {0}")]
    Store(String),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prometheus metrics errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Check if this is a client error (4xx equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Validation(_) | Error::MalformedIdentifier(_)
        )
    }

    /// Check if this is a server error (5xx equivalent)
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Short label used for the outcome dimension of request metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Validation(_) | Error::MalformedIdentifier(_) => "invalid",
            Error::StoreUnavailable(_) => "unavailable",
            _ => "error",
        }
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::DnsResolve { .. } => Error::StoreUnavailable(err.to_string()),
            _ => Error::Store(err.to_string()),
        }
    }
}
