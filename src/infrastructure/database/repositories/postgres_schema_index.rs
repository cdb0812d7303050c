use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use pgvector::{Vector, VectorExpressionMethods};
use uuid::Uuid;

use crate::domain::repositories::{
    SchemaEmbeddingRecord, SchemaIndexError, SchemaIndexRepository, StoredEmbeddingPreview,
};
use crate::infrastructure::database::connection::{DbPool, get_connection_from_pool};
use crate::infrastructure::database::models::{NewResultRecordModel, SchemaEmbeddingModel};

const PREVIEW_COMPONENTS: usize = 8;

/// pgvector-backed schema index. Ranking uses the native `<->` (L2) operator;
/// upsert is ON CONFLICT (table_name) DO UPDATE, so re-extraction overwrites
/// rather than duplicates.
pub struct PostgresSchemaIndexRepository {
    pool: DbPool,
    dimension: usize,
}

#[derive(QueryableByName)]
struct ColumnTypmod {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    atttypmod: i32,
}

impl PostgresSchemaIndexRepository {
    pub fn new(pool: DbPool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    fn check_dimension(&self, vector: &Vector) -> Result<(), SchemaIndexError> {
        check_dimension(self.dimension, vector.as_slice().len())
    }

    /// Compares the configured dimension against the vector column the
    /// migrations created. A stale migration would otherwise pass
    /// `check_dimension` and fail later inside Postgres as an opaque
    /// database error. Run once at startup.
    pub fn verify_column_dimension(&self) -> Result<(), SchemaIndexError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SchemaIndexError::Unavailable(e.to_string()))?;

        let row: ColumnTypmod = diesel::sql_query(
            "SELECT atttypmod FROM pg_attribute \
             WHERE attrelid = 'schema_embeddings'::regclass AND attname = 'embedding'",
        )
        .get_result(&mut conn)
        .map_err(|e| SchemaIndexError::Database(e.to_string()))?;

        check_declared_dimension(self.dimension, row.atttypmod)
    }
}

/// Dimension mismatches are a configuration error: rejected outright, never
/// truncated or padded.
fn check_dimension(expected: usize, actual: usize) -> Result<(), SchemaIndexError> {
    if expected != actual {
        return Err(SchemaIndexError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// pgvector stores the declared dimension directly in the column typmod;
/// -1 means the column was created unconstrained.
fn check_declared_dimension(expected: usize, typmod: i32) -> Result<(), SchemaIndexError> {
    match (typmod > 0).then_some(typmod as usize) {
        Some(actual) if actual != expected => {
            Err(SchemaIndexError::DimensionMismatch { expected, actual })
        }
        _ => Ok(()),
    }
}

#[async_trait]
impl SchemaIndexRepository for PostgresSchemaIndexRepository {
    async fn upsert(
        &self,
        table: &str,
        descriptor_text: &str,
        descriptor_embedding: Vector,
    ) -> Result<(), SchemaIndexError> {
        use crate::infrastructure::database::schema::schema_embeddings::dsl::*;

        self.check_dimension(&descriptor_embedding)?;

        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SchemaIndexError::Unavailable(e.to_string()))?;

        let record = SchemaEmbeddingModel {
            table_name: table.to_string(),
            schema_details: descriptor_text.to_string(),
            embedding: descriptor_embedding,
        };

        diesel::insert_into(schema_embeddings)
            .values(&record)
            .on_conflict(table_name)
            .do_update()
            .set((
                schema_details.eq(&record.schema_details),
                embedding.eq(&record.embedding),
            ))
            .execute(&mut conn)
            .map_err(|e| SchemaIndexError::Database(e.to_string()))?;

        Ok(())
    }

    async fn nearest(
        &self,
        query: &Vector,
        k: usize,
    ) -> Result<Vec<SchemaEmbeddingRecord>, SchemaIndexError> {
        use crate::infrastructure::database::schema::schema_embeddings::dsl::*;

        self.check_dimension(query)?;

        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SchemaIndexError::Unavailable(e.to_string()))?;

        let models = schema_embeddings
            .order(embedding.l2_distance(query.clone()))
            .limit(k as i64)
            .load::<SchemaEmbeddingModel>(&mut conn)
            .map_err(|e| SchemaIndexError::Database(e.to_string()))?;

        Ok(models.into_iter().map(SchemaEmbeddingRecord::from).collect())
    }

    async fn store_result_record(
        &self,
        record_content: &str,
        record_embedding: Vector,
    ) -> Result<Uuid, SchemaIndexError> {
        use crate::infrastructure::database::schema::result_records::dsl::*;

        self.check_dimension(&record_embedding)?;

        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SchemaIndexError::Unavailable(e.to_string()))?;

        let record = NewResultRecordModel {
            id: Uuid::new_v4(),
            content: record_content.to_string(),
            embedding: record_embedding,
            created_at: Utc::now(),
        };

        diesel::insert_into(result_records)
            .values(&record)
            .execute(&mut conn)
            .map_err(|e| SchemaIndexError::Database(e.to_string()))?;

        Ok(record.id)
    }

    async fn stored_previews(
        &self,
        preview_limit: i64,
    ) -> Result<Vec<StoredEmbeddingPreview>, SchemaIndexError> {
        use crate::infrastructure::database::schema::schema_embeddings::dsl::*;

        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SchemaIndexError::Unavailable(e.to_string()))?;

        let models = schema_embeddings
            .order(table_name.asc())
            .limit(preview_limit)
            .load::<SchemaEmbeddingModel>(&mut conn)
            .map_err(|e| SchemaIndexError::Database(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|model| {
                let slice = model.embedding.as_slice();
                StoredEmbeddingPreview {
                    table_name: model.table_name,
                    dimension: slice.len(),
                    preview: slice.iter().take(PREVIEW_COMPONENTS).copied().collect(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_dimension_is_rejected() {
        let err = check_dimension(1024, 768).unwrap_err();

        assert!(matches!(
            err,
            SchemaIndexError::DimensionMismatch {
                expected: 1024,
                actual: 768
            }
        ));
    }

    #[test]
    fn matching_dimension_passes() {
        assert!(check_dimension(1024, 1024).is_ok());
    }

    #[test]
    fn column_created_with_a_different_dimension_is_rejected() {
        let err = check_declared_dimension(768, 1024).unwrap_err();

        assert!(matches!(
            err,
            SchemaIndexError::DimensionMismatch {
                expected: 768,
                actual: 1024
            }
        ));
    }

    #[test]
    fn unconstrained_column_is_accepted() {
        assert!(check_declared_dimension(768, -1).is_ok());
        assert!(check_declared_dimension(1024, 1024).is_ok());
    }
}
