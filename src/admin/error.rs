//! Admin server error definitions.

use thiserror::Error;

use crate::admin::status::ServerStatus;

/// Errors returned by the admin server lifecycle calls.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The listening socket could not be bound.
    #[error("failed to bind admin server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Closing the listener failed.
    #[error("failed to close admin server listener: {0}")]
    Close(#[source] std::io::Error),

    /// `stop` was called before a successful `start`.
    #[error("admin server was never started")]
    NotStarted,

    /// `start` was called on an instance that already left `NotStarted`.
    #[error("admin server cannot start: already {0}")]
    InvalidState(ServerStatus),
}

/// Reasons the serving loop ended.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("accept failed: {0}")]
    Accept(#[from] std::io::Error),
}
