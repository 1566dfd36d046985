pub mod memory;
pub mod models;
pub mod postgres;
pub mod sqlite;

use std::sync::Arc;

use crate::config::{DatabaseConfig, Driver};
use crate::domain::{RepositoryError, SharedOrderRepository};

pub use memory::MemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use sqlite::SqliteOrderRepository;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for RepositoryError {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match e {
            Error::NotFound => RepositoryError::NotFound,
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                RepositoryError::AlreadyExists
            }
            other => RepositoryError::Io(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for RepositoryError {
    fn from(e: r2d2::Error) -> Self {
        RepositoryError::Io(e.to_string())
    }
}

// ── Factory ──────────────────────────────────────────────────────────────────

/// Builds the repository selected by `cfg.driver`. Construction is fatal on
/// bad configuration, unreachable servers or failed migrations; a repository
/// is only returned once it is fully usable.
pub fn connect(cfg: &DatabaseConfig) -> Result<SharedOrderRepository, RepositoryError> {
    match cfg.driver {
        Driver::Memory => Ok(Arc::new(MemoryOrderRepository::new())),
        Driver::Sqlite => Ok(Arc::new(SqliteOrderRepository::connect(cfg)?)),
        Driver::Postgres => Ok(Arc::new(PostgresOrderRepository::connect(cfg)?)),
    }
}
