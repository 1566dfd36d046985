use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::RunQueryDsl;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::config::DatabaseConfig;
use crate::domain::RepositoryError;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Ceiling applied to connection checkout and, database-side, to every
/// statement. Independent of any caller deadline; on expiry the operation
/// fails and is never retried.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

pub const POSTGRES_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/postgres");
pub const SQLITE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/sqlite");

/// Caps statement time for every session handed out by the pool.
#[derive(Debug)]
struct PgSessionSetup;

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for PgSessionSetup {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        diesel::sql_query(format!(
            "SET statement_timeout = {}",
            OPERATION_TIMEOUT.as_millis()
        ))
        .execute(conn)
        .map(|_| ())
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// SQLite sessions wait out lock contention up to the same ceiling and
/// enforce foreign keys.
#[derive(Debug)]
struct SqliteSessionSetup;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteSessionSetup {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        diesel::sql_query(format!(
            "PRAGMA busy_timeout = {}",
            OPERATION_TIMEOUT.as_millis()
        ))
        .execute(conn)
        .map_err(diesel::r2d2::Error::QueryError)?;
        diesel::sql_query("PRAGMA foreign_keys = ON")
            .execute(conn)
            .map(|_| ())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Phase one of repository construction: build the pool. `r2d2` checks out
/// an initial connection during `build`, so an unreachable server fails
/// here, within `OPERATION_TIMEOUT`, before any migration is attempted.
pub fn open_postgres(cfg: &DatabaseConfig) -> Result<PgPool, RepositoryError> {
    let manager = ConnectionManager::<PgConnection>::new(cfg.postgres_url());
    Pool::builder()
        .max_size(cfg.max_open_conns)
        .connection_timeout(OPERATION_TIMEOUT)
        .connection_customizer(Box::new(PgSessionSetup))
        .build(manager)
        .map_err(|e| RepositoryError::ConnectionFailure(e.to_string()))
}

pub fn open_sqlite(cfg: &DatabaseConfig) -> Result<SqlitePool, RepositoryError> {
    let manager = ConnectionManager::<SqliteConnection>::new(&cfg.sqlite_path);
    Pool::builder()
        .max_size(cfg.max_open_conns)
        .connection_timeout(OPERATION_TIMEOUT)
        .connection_customizer(Box::new(SqliteSessionSetup))
        .build(manager)
        .map_err(|e| RepositoryError::ConnectionFailure(e.to_string()))
}

/// Phase two: apply pending migrations, forward-only and version-tracked.
/// Running against a current schema is a no-op; any other failure is fatal
/// to construction.
pub fn run_postgres_migrations(pool: &PgPool) -> Result<(), RepositoryError> {
    let mut conn = pool
        .get()
        .map_err(|e| RepositoryError::ConnectionFailure(e.to_string()))?;
    conn.run_pending_migrations(POSTGRES_MIGRATIONS)
        .map(|_| ())
        .map_err(|e| RepositoryError::ConnectionFailure(e.to_string()))
}

pub fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), RepositoryError> {
    let mut conn = pool
        .get()
        .map_err(|e| RepositoryError::ConnectionFailure(e.to_string()))?;
    conn.run_pending_migrations(SQLITE_MIGRATIONS)
        .map(|_| ())
        .map_err(|e| RepositoryError::ConnectionFailure(e.to_string()))
}
