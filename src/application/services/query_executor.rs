use serde_json::Value;
use std::sync::Arc;

use crate::application::ports::{
    EmbeddingProvider, EmbeddingServiceError, GenerationProvider, GenerationServiceError,
    RelationalStore, RelationalStoreError,
};
use crate::domain::repositories::{SchemaIndexError, SchemaIndexRepository};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionOptions {
    /// Serialize the row set, embed it, and keep it in the vector store.
    pub store_result: bool,
    /// Pass the row set through the generation model for an analysis text.
    pub summarize: bool,
}

#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub statement: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    pub analysis: Option<String>,
}

#[derive(Debug)]
pub enum QueryExecutorError {
    /// The statement itself failed in the store. A data/query error, distinct
    /// from infrastructure errors, so the caller can decide to re-prompt.
    Execution(String),
    StoreUnreachable(String),
    Summarization(GenerationServiceError),
    ResultEmbedding(EmbeddingServiceError),
    ResultStorage(SchemaIndexError),
}

impl std::fmt::Display for QueryExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryExecutorError::Execution(msg) => write!(f, "query execution failed: {}", msg),
            QueryExecutorError::StoreUnreachable(msg) => {
                write!(f, "relational store unreachable: {}", msg)
            }
            QueryExecutorError::Summarization(e) => write!(f, "result summarization failed: {}", e),
            QueryExecutorError::ResultEmbedding(e) => write!(f, "result embedding failed: {}", e),
            QueryExecutorError::ResultStorage(e) => write!(f, "result storage failed: {}", e),
        }
    }
}

impl std::error::Error for QueryExecutorError {}

/// Runs an extracted statement verbatim against the relational store, with
/// optional result embedding and summarization.
pub struct QueryExecutor {
    store: Arc<dyn RelationalStore>,
    generation_provider: Arc<dyn GenerationProvider>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    schema_index: Arc<dyn SchemaIndexRepository>,
    max_result_rows: usize,
}

impl QueryExecutor {
    pub fn new(
        store: Arc<dyn RelationalStore>,
        generation_provider: Arc<dyn GenerationProvider>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        schema_index: Arc<dyn SchemaIndexRepository>,
        max_result_rows: usize,
    ) -> Self {
        Self {
            store,
            generation_provider,
            embedding_provider,
            schema_index,
            max_result_rows,
        }
    }

    pub async fn execute(
        &self,
        statement: &str,
        options: ExecutionOptions,
    ) -> Result<ExecutionOutcome, QueryExecutorError> {
        let result = self
            .store
            .run_statement(statement, self.max_result_rows)
            .await
            .map_err(|e| match e {
                RelationalStoreError::Unreachable(msg) => {
                    QueryExecutorError::StoreUnreachable(msg)
                }
                RelationalStoreError::Execution(msg) => QueryExecutorError::Execution(msg),
            })?;

        tracing::info!(rows = result.row_count, "statement executed");

        let serialized = render_rows(&result.columns, &result.rows);

        if options.store_result {
            let embedding = self
                .embedding_provider
                .embed(&serialized)
                .await
                .map_err(QueryExecutorError::ResultEmbedding)?;
            let record_id = self
                .schema_index
                .store_result_record(&serialized, embedding)
                .await
                .map_err(QueryExecutorError::ResultStorage)?;
            tracing::debug!(%record_id, "query result stored in vector index");
        }

        let analysis = if options.summarize {
            let prompt = summarization_prompt(&serialized);
            Some(
                self.generation_provider
                    .generate(&prompt)
                    .await
                    .map_err(QueryExecutorError::Summarization)?,
            )
        } else {
            None
        };

        Ok(ExecutionOutcome {
            statement: statement.to_string(),
            columns: result.columns,
            rows: result.rows,
            row_count: result.row_count,
            analysis,
        })
    }
}

/// One line per row, each rendered as a column-to-value JSON object.
pub(crate) fn render_rows(columns: &[String], rows: &[Vec<Value>]) -> String {
    rows.iter()
        .map(|row| {
            let object: serde_json::Map<String, Value> = columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect();
            Value::Object(object).to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn summarization_prompt(serialized_rows: &str) -> String {
    format!(
        "Analyze the following data and provide insights:\n{}",
        serialized_rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pgvector::Vector;
    use serde_json::json;
    use uuid::Uuid;

    use crate::application::ports::StatementResult;
    use crate::domain::entities::{ColumnSpec, Relation};
    use crate::domain::repositories::{SchemaEmbeddingRecord, StoredEmbeddingPreview};

    struct StubStore {
        result: StatementResult,
    }

    #[async_trait]
    impl RelationalStore for StubStore {
        async fn list_tables(&self) -> Result<Vec<String>, RelationalStoreError> {
            Ok(vec![])
        }

        async fn table_columns(
            &self,
            _table: &str,
        ) -> Result<Vec<ColumnSpec>, RelationalStoreError> {
            Ok(vec![])
        }

        async fn table_relations(
            &self,
            _table: &str,
        ) -> Result<Vec<Relation>, RelationalStoreError> {
            Ok(vec![])
        }

        async fn table_row_count(&self, _table: &str) -> Result<i64, RelationalStoreError> {
            Ok(0)
        }

        async fn table_definition(&self, _table: &str) -> Result<String, RelationalStoreError> {
            Ok(String::new())
        }

        async fn run_statement(
            &self,
            _statement: &str,
            _max_rows: usize,
        ) -> Result<StatementResult, RelationalStoreError> {
            Ok(self.result.clone())
        }
    }

    struct StubGeneration;

    #[async_trait]
    impl GenerationProvider for StubGeneration {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationServiceError> {
            assert!(prompt.starts_with("Analyze the following data"));
            Ok("Sales are trending upward.".to_string())
        }
    }

    struct StubEmbedding;

    #[async_trait]
    impl EmbeddingProvider for StubEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vector, EmbeddingServiceError> {
            Ok(Vector::from(vec![0.0, 1.0]))
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct StubIndex;

    #[async_trait]
    impl SchemaIndexRepository for StubIndex {
        async fn upsert(
            &self,
            _table_name: &str,
            _descriptor_text: &str,
            _embedding: Vector,
        ) -> Result<(), SchemaIndexError> {
            Ok(())
        }

        async fn nearest(
            &self,
            _query: &Vector,
            _k: usize,
        ) -> Result<Vec<SchemaEmbeddingRecord>, SchemaIndexError> {
            Ok(Vec::new())
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
            _limit: i64,
        ) -> Result<Vec<StoredEmbeddingPreview>, SchemaIndexError> {
            Ok(Vec::new())
        }
    }

    fn executor_with_rows() -> QueryExecutor {
        QueryExecutor::new(
            Arc::new(StubStore {
                result: StatementResult {
                    columns: vec!["region".to_string(), "total".to_string()],
                    rows: vec![
                        vec![json!("east"), json!(10)],
                        vec![json!("west"), json!(4)],
                    ],
                    row_count: 2,
                },
            }),
            Arc::new(StubGeneration),
            Arc::new(StubEmbedding),
            Arc::new(StubIndex),
            1000,
        )
    }

    #[tokio::test]
    async fn execute_returns_rows_without_analysis_by_default() {
        let outcome = executor_with_rows()
            .execute("select region, total from sales", ExecutionOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.row_count, 2);
        assert_eq!(outcome.columns, vec!["region", "total"]);
        assert!(outcome.analysis.is_none());
    }

    #[tokio::test]
    async fn summarize_attaches_analysis_text() {
        let options = ExecutionOptions {
            summarize: true,
            ..Default::default()
        };
        let outcome = executor_with_rows()
            .execute("select region, total from sales", options)
            .await
            .unwrap();

        assert_eq!(outcome.analysis.as_deref(), Some("Sales are trending upward."));
    }

    #[test]
    fn rows_render_as_one_json_object_per_line() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![vec![json!(1), json!("ada")], vec![json!(2), json!("bob")]];

        let rendered = render_rows(&columns, &rows);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"id":1,"name":"ada"}"#);
    }
}
