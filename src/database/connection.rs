use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::{DatabaseErrorKind, Error};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{info, warn};
use std::path::Path;
use std::time::Duration;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Upper bound on re-attempts of a write that lost a race to another writer.
pub const CONFLICT_RETRIES: usize = 10;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = diesel::r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

/// SQLite connection customizer to enable WAL mode and set pragmas for concurrent readers
#[derive(Debug)]
pub struct SqliteConnectionCustomizer;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        use diesel::sql_query;

        // Busy timeout has to be in place before anything takes a lock
        sql_query("PRAGMA busy_timeout = 30000")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        let mut wal_attempts = 0;
        let max_wal_attempts = 3;
        loop {
            match sql_query("PRAGMA journal_mode = WAL").execute(conn) {
                Ok(_) => break,
                Err(e) => {
                    wal_attempts += 1;
                    if wal_attempts >= max_wal_attempts {
                        warn!(
                            "Failed to enable WAL mode after {} attempts: {}",
                            max_wal_attempts, e
                        );
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
            }
        }

        if let Err(e) = sql_query("PRAGMA foreign_keys = ON").execute(conn) {
            warn!("Failed to enable foreign keys: {}", e);
        }

        if let Err(e) = sql_query("PRAGMA synchronous = NORMAL").execute(conn) {
            warn!("Failed to set synchronous mode: {}", e);
        }

        // Negative value means KB
        if let Err(e) = sql_query("PRAGMA cache_size = -32000").execute(conn) {
            warn!("Failed to set cache size: {}", e);
        }

        if let Err(e) = sql_query("PRAGMA temp_store = MEMORY").execute(conn) {
            warn!("Failed to set temp store: {}", e);
        }

        Ok(())
    }
}

/// Creates the connection pool and brings the schema up to date
pub fn create_pool(database_url: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    if let Some(parent) = Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(16)
        .min_idle(Some(2))
        .connection_timeout(Duration::from_secs(30))
        .idle_timeout(Some(Duration::from_secs(300)))
        .max_lifetime(Some(Duration::from_secs(1800)))
        .connection_customizer(Box::new(SqliteConnectionCustomizer))
        .build(manager)?;

    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| format!("Failed to run migrations: {}", e))?;

    info!("Database initialized at {}", database_url);

    Ok(pool)
}

/// Gets a connection from the pool with retry logic and exponential backoff
pub fn get_connection_with_retry(pool: &DbPool) -> Result<DbConnection, diesel::r2d2::Error> {
    let mut attempts = 0;
    let max_attempts = 5;

    loop {
        match pool.get() {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                attempts += 1;
                if attempts >= max_attempts {
                    return Err(diesel::r2d2::Error::ConnectionError(
                        diesel::ConnectionError::BadConnection(format!(
                            "Failed to get connection after {} attempts: {}",
                            max_attempts, e
                        )),
                    ));
                }

                // 10ms, 20ms, 40ms, 80ms
                let delay = Duration::from_millis(10 * (1 << (attempts - 1)));
                std::thread::sleep(delay);
            }
        }
    }
}

/// Same as [`get_connection_with_retry`], with pool failures folded into a
/// diesel error so query code can use `?` throughout.
pub fn checkout(pool: &DbPool) -> Result<DbConnection, Error> {
    get_connection_with_retry(pool).map_err(|e| {
        Error::DatabaseError(DatabaseErrorKind::UnableToSendCommand, Box::new(e.to_string()))
    })
}

/// Whether a failed write lost a race against a concurrent writer and may
/// succeed when attempted again.
pub fn is_conflict(err: &Error) -> bool {
    match err {
        Error::DatabaseError(kind, info) => {
            if matches!(
                kind,
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::SerializationFailure
            ) {
                return true;
            }
            let message = info.message().to_lowercase();
            message.contains("deadlock") || message.contains("locked")
        }
        _ => false,
    }
}

/// Runs `operation`, re-running it up to [`CONFLICT_RETRIES`] times while it
/// fails with a conflict. Any other error is returned at once.
pub fn retry_on_conflict<T, F>(mut operation: F) -> Result<T, Error>
where
    F: FnMut() -> Result<T, Error>,
{
    let mut attempts = 0;
    loop {
        match operation() {
            Err(e) if attempts < CONFLICT_RETRIES && is_conflict(&e) => {
                attempts += 1;
                warn!("Write conflict (attempt {}/{}): {}", attempts, CONFLICT_RETRIES, e);
            }
            result => return result,
        }
    }
}
