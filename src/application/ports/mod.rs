pub mod embedding_provider;
pub mod generation_provider;
pub mod relational_store;

pub use embedding_provider::{EmbeddingProvider, EmbeddingServiceError};
pub use generation_provider::{GenerationProvider, GenerationServiceError};
pub use relational_store::{RelationalStore, RelationalStoreError, StatementResult};
