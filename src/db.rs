//! SQLite connection pool shared by the repository.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Used when the configuration does not set `db_timeout_secs`.
pub const DEFAULT_DB_TIMEOUT: Duration = Duration::from_secs(5);

/// Applies per-connection pragmas as connections are handed out.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
            self.busy_timeout.as_millis()
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

/// Builds a pool with the default timeout.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    establish_connection_pool_with_timeout(database_url, DEFAULT_DB_TIMEOUT)
}

/// Builds a pool whose checkout timeout and SQLite busy timeout are both
/// `timeout`.
pub fn establish_connection_pool_with_timeout(
    database_url: &str,
    timeout: Duration,
) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_timeout(timeout)
        .connection_customizer(Box::new(SqlitePragmas {
            busy_timeout: timeout,
        }))
        .build(manager)
}
