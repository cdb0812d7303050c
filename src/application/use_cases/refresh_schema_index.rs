use std::sync::Arc;

use crate::application::ports::{EmbeddingProvider, EmbeddingServiceError};
use crate::application::services::{SchemaDescriptorBuilder, SchemaIntrospectionError};
use crate::domain::repositories::{SchemaIndexError, SchemaIndexRepository};

#[derive(Debug, Clone, serde::Serialize)]
pub struct TableRefreshSummary {
    pub table_name: String,
    pub descriptor_chars: usize,
}

#[derive(Debug)]
pub enum RefreshSchemaIndexError {
    Introspection(SchemaIntrospectionError),
    Embedding { table: String, source: EmbeddingServiceError },
    Index { table: String, source: SchemaIndexError },
}

impl std::fmt::Display for RefreshSchemaIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshSchemaIndexError::Introspection(e) => write!(f, "{}", e),
            RefreshSchemaIndexError::Embedding { table, source } => {
                write!(f, "embedding descriptor for {} failed: {}", table, source)
            }
            RefreshSchemaIndexError::Index { table, source } => {
                write!(f, "upserting record for {} failed: {}", table, source)
            }
        }
    }
}

impl std::error::Error for RefreshSchemaIndexError {}

/// Maintenance operation: rebuild every table descriptor, embed its text, and
/// upsert the record keyed by table name. Re-running overwrites prior
/// records, never leaves stale duplicates. Not intended for the request path;
/// callers serialize concurrent refreshes.
pub struct RefreshSchemaIndexUseCase {
    builder: Arc<SchemaDescriptorBuilder>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    schema_index: Arc<dyn SchemaIndexRepository>,
}

impl RefreshSchemaIndexUseCase {
    pub fn new(
        builder: Arc<SchemaDescriptorBuilder>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        schema_index: Arc<dyn SchemaIndexRepository>,
    ) -> Self {
        Self {
            builder,
            embedding_provider,
            schema_index,
        }
    }

    pub async fn execute(&self) -> Result<Vec<TableRefreshSummary>, RefreshSchemaIndexError> {
        let descriptors = self
            .builder
            .build()
            .await
            .map_err(RefreshSchemaIndexError::Introspection)?;

        let mut summaries = Vec::with_capacity(descriptors.len());
        for (table_name, descriptor) in descriptors {
            let descriptor_text = descriptor.descriptor_text();

            let embedding = self
                .embedding_provider
                .embed(&descriptor_text)
                .await
                .map_err(|source| RefreshSchemaIndexError::Embedding {
                    table: table_name.clone(),
                    source,
                })?;

            self.schema_index
                .upsert(&table_name, &descriptor_text, embedding)
                .await
                .map_err(|source| RefreshSchemaIndexError::Index {
                    table: table_name.clone(),
                    source,
                })?;

            tracing::info!(table = %table_name, "schema embedding refreshed");
            summaries.push(TableRefreshSummary {
                table_name,
                descriptor_chars: descriptor_text.len(),
            });
        }

        Ok(summaries)
    }
}
