use thiserror::Error;

use crate::config::ConfigError;

/// Error taxonomy shared by every repository backend. Transports map these
/// to wire-level codes; nothing in the core retries or reinterprets them.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Validation failed; the order was never persisted.
    #[error("invalid entity")]
    InvalidEntity,

    /// A caller-supplied id collided with a live entry on create.
    #[error("order already exists")]
    AlreadyExists,

    /// The target id does not exist.
    #[error("order not found")]
    NotFound,

    /// Configuration rejected before any connection attempt.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Construction-time connectivity or migration failure. The repository
    /// is unusable and is never handed to callers.
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// Timeout or I/O error on a single operation, surfaced unretried.
    #[error("i/o failure: {0}")]
    Io(String),
}
