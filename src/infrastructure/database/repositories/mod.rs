pub mod postgres_schema_index;

pub use postgres_schema_index::PostgresSchemaIndexRepository;
