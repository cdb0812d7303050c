use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::ports::{RelationalStore, RelationalStoreError};
use crate::domain::entities::SchemaDescriptor;

#[derive(Debug)]
pub enum SchemaIntrospectionError {
    StoreUnreachable(String),
    /// One table's structure could not be read; the whole build is discarded.
    TableReadFailed { table: String, message: String },
}

impl std::fmt::Display for SchemaIntrospectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaIntrospectionError::StoreUnreachable(msg) => {
                write!(f, "relational store unreachable: {}", msg)
            }
            SchemaIntrospectionError::TableReadFailed { table, message } => {
                write!(f, "failed to introspect table {}: {}", table, message)
            }
        }
    }
}

impl std::error::Error for SchemaIntrospectionError {}

/// Introspects the relational store's structure into one complete descriptor
/// per table. Read-only, all-or-nothing per invocation.
pub struct SchemaDescriptorBuilder {
    store: Arc<dyn RelationalStore>,
}

impl SchemaDescriptorBuilder {
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        Self { store }
    }

    pub async fn build(
        &self,
    ) -> Result<BTreeMap<String, SchemaDescriptor>, SchemaIntrospectionError> {
        let tables = self.store.list_tables().await.map_err(unreachable_error)?;

        let mut descriptors = BTreeMap::new();
        for table in tables {
            let descriptor = self.build_table(&table).await.map_err(|e| match e {
                RelationalStoreError::Unreachable(msg) => {
                    SchemaIntrospectionError::StoreUnreachable(msg)
                }
                RelationalStoreError::Execution(message) => {
                    SchemaIntrospectionError::TableReadFailed {
                        table: table.clone(),
                        message,
                    }
                }
            })?;
            descriptors.insert(table, descriptor);
        }

        tracing::debug!(tables = descriptors.len(), "schema build complete");
        Ok(descriptors)
    }

    /// Grouped table-to-columns rendering for the schema-info capability.
    pub async fn overview(&self) -> Result<String, SchemaIntrospectionError> {
        let descriptors = self.build().await?;

        Ok(descriptors
            .values()
            .map(SchemaDescriptor::overview_line)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn build_table(&self, table: &str) -> Result<SchemaDescriptor, RelationalStoreError> {
        let column_specs = self.store.table_columns(table).await?;
        let relations = self.store.table_relations(table).await?;
        let row_count = self.store.table_row_count(table).await?;
        let raw_definition = self.store.table_definition(table).await?;

        Ok(SchemaDescriptor {
            table_name: table.to_string(),
            column_specs,
            relations,
            row_count,
            raw_definition,
        })
    }
}

fn unreachable_error(e: RelationalStoreError) -> SchemaIntrospectionError {
    match e {
        RelationalStoreError::Unreachable(msg) => SchemaIntrospectionError::StoreUnreachable(msg),
        RelationalStoreError::Execution(msg) => SchemaIntrospectionError::StoreUnreachable(msg),
    }
}
