pub mod schema_index_repository;

pub use schema_index_repository::{
    SchemaEmbeddingRecord, SchemaIndexError, SchemaIndexRepository, StoredEmbeddingPreview,
};
