use async_trait::async_trait;
use pgvector::Vector;
use uuid::Uuid;

/// One stored (table, descriptor text, embedding) triple.
#[derive(Debug, Clone)]
pub struct SchemaEmbeddingRecord {
    pub table_name: String,
    pub descriptor_text: String,
    pub embedding: Vector,
}

/// Truncated view of a stored record for the verification surface.
#[derive(Debug, Clone)]
pub struct StoredEmbeddingPreview {
    pub table_name: String,
    pub dimension: usize,
    pub preview: Vec<f32>,
}

#[derive(Debug)]
pub enum SchemaIndexError {
    /// The backing store could not be reached.
    Unavailable(String),
    /// A vector's dimension disagrees with the configured index dimension.
    /// Never silently truncated or padded.
    DimensionMismatch { expected: usize, actual: usize },
    Database(String),
}

impl std::fmt::Display for SchemaIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaIndexError::Unavailable(msg) => write!(f, "index unavailable: {}", msg),
            SchemaIndexError::DimensionMismatch { expected, actual } => write!(
                f,
                "embedding dimension mismatch: expected {}, got {}",
                expected, actual
            ),
            SchemaIndexError::Database(msg) => write!(f, "index database error: {}", msg),
        }
    }
}

impl std::error::Error for SchemaIndexError {}

/// Persistence contract for schema embeddings. Ranking uses L2 distance via
/// the store's native `<->` operator; upsert is last-write-wins per
/// table_name.
#[async_trait]
pub trait SchemaIndexRepository: Send + Sync {
    async fn upsert(
        &self,
        table_name: &str,
        descriptor_text: &str,
        embedding: Vector,
    ) -> Result<(), SchemaIndexError>;

    /// The k stored records closest to `query`, ascending by distance.
    async fn nearest(
        &self,
        query: &Vector,
        k: usize,
    ) -> Result<Vec<SchemaEmbeddingRecord>, SchemaIndexError>;

    /// Stores a free-form content/embedding pair, distinct from the schema
    /// records. Used for persisted query results.
    async fn store_result_record(
        &self,
        content: &str,
        embedding: Vector,
    ) -> Result<Uuid, SchemaIndexError>;

    async fn stored_previews(
        &self,
        limit: i64,
    ) -> Result<Vec<StoredEmbeddingPreview>, SchemaIndexError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Minimal in-memory index honoring the trait contract: last-write-wins
    /// per table_name, ascending L2 ordering.
    #[derive(Default)]
    struct InMemoryIndex {
        records: Mutex<BTreeMap<String, SchemaEmbeddingRecord>>,
    }

    fn l2(a: &Vector, b: &Vector) -> f32 {
        a.as_slice()
            .iter()
            .zip(b.as_slice())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    #[async_trait]
    impl SchemaIndexRepository for InMemoryIndex {
        async fn upsert(
            &self,
            table_name: &str,
            descriptor_text: &str,
            embedding: Vector,
        ) -> Result<(), SchemaIndexError> {
            self.records.lock().unwrap().insert(
                table_name.to_string(),
                SchemaEmbeddingRecord {
                    table_name: table_name.to_string(),
                    descriptor_text: descriptor_text.to_string(),
                    embedding,
                },
            );
            Ok(())
        }

        async fn nearest(
            &self,
            query: &Vector,
            k: usize,
        ) -> Result<Vec<SchemaEmbeddingRecord>, SchemaIndexError> {
            let mut records: Vec<SchemaEmbeddingRecord> =
                self.records.lock().unwrap().values().cloned().collect();
            records.sort_by(|a, b| {
                l2(&a.embedding, query).total_cmp(&l2(&b.embedding, query))
            });
            records.truncate(k);
            Ok(records)
        }

        async fn store_result_record(
            &self,
            _content: &str,
            _embedding: Vector,
        ) -> Result<Uuid, SchemaIndexError> {
            Ok(Uuid::new_v4())
        }

        async fn stored_previews(
            &self,
            limit: i64,
        ) -> Result<Vec<StoredEmbeddingPreview>, SchemaIndexError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .take(limit as usize)
                .map(|record| StoredEmbeddingPreview {
                    table_name: record.table_name.clone(),
                    dimension: record.embedding.as_slice().len(),
                    preview: record.embedding.as_slice().to_vec(),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn repeated_upsert_under_one_table_keeps_only_the_latest_record() {
        let index = InMemoryIndex::default();

        index
            .upsert("users", "old descriptor", Vector::from(vec![1.0, 0.0]))
            .await
            .unwrap();
        index
            .upsert("users", "new descriptor", Vector::from(vec![0.0, 1.0]))
            .await
            .unwrap();

        let records = index.nearest(&Vector::from(vec![0.0, 1.0]), 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].descriptor_text, "new descriptor");
    }

    #[tokio::test]
    async fn a_records_own_embedding_ranks_it_first() {
        let index = InMemoryIndex::default();

        index
            .upsert("users", "users table", Vector::from(vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();
        index
            .upsert("orders", "orders table", Vector::from(vec![0.0, 1.0, 0.0]))
            .await
            .unwrap();
        index
            .upsert("invoices", "invoices table", Vector::from(vec![0.0, 0.0, 1.0]))
            .await
            .unwrap();

        let records = index
            .nearest(&Vector::from(vec![0.0, 1.0, 0.0]), 3)
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].table_name, "orders");
    }
}
