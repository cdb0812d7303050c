pub mod connection;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod sqlite_store;

pub use connection::{DbPool, create_connection_pool, get_connection_from_pool, run_migrations};
pub use repositories::PostgresSchemaIndexRepository;
pub use sqlite_store::SqliteStore;
