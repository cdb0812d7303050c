use diesel::{
    PgConnection,
    r2d2::{self, ConnectionManager},
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

#[derive(Debug)]
pub enum DatabaseError {
    ConnectionError(String),
    PoolError(String),
    MigrationError(String),
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseError::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            DatabaseError::PoolError(msg) => write!(f, "Pool error: {}", msg),
            DatabaseError::MigrationError(msg) => write!(f, "Migration error: {}", msg),
        }
    }
}

impl std::error::Error for DatabaseError {}

pub fn create_connection_pool(database_url: &str) -> Result<DbPool, DatabaseError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    r2d2::Pool::builder()
        .max_size(10)
        .min_idle(Some(1))
        .build(manager)
        .map_err(|e| DatabaseError::PoolError(e.to_string()))
}

pub fn get_connection_from_pool(pool: &DbPool) -> Result<DbConnection, DatabaseError> {
    pool.get()
        .map_err(|e| DatabaseError::PoolError(e.to_string()))
}

/// Applies pending migrations so the index tables exist before first upsert.
/// Idempotent; safe to run on every startup.
pub fn run_migrations(pool: &DbPool) -> Result<(), DatabaseError> {
    let mut conn = get_connection_from_pool(pool)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    Ok(())
}
