use std::sync::Arc;

use crate::application::ports::{
    EmbeddingProvider, EmbeddingServiceError, GenerationProvider, GenerationServiceError,
};
use crate::domain::entities::SqlCandidate;
use crate::domain::repositories::{
    SchemaEmbeddingRecord, SchemaIndexError, SchemaIndexRepository,
};

#[derive(Debug)]
pub enum SqlSynthesisError {
    Embedding(EmbeddingServiceError),
    Index(SchemaIndexError),
    /// Retrieval produced no schema records; the generation model is never
    /// prompted with empty context.
    EmptySchemaContext,
    Generation(GenerationServiceError),
    /// Extraction could not produce an executable statement. Carries the raw
    /// model output for logging.
    Extraction { raw_model_output: String },
}

impl std::fmt::Display for SqlSynthesisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlSynthesisError::Embedding(e) => write!(f, "question embedding failed: {}", e),
            SqlSynthesisError::Index(e) => write!(f, "schema retrieval failed: {}", e),
            SqlSynthesisError::EmptySchemaContext => {
                write!(f, "no schema context retrieved for question")
            }
            SqlSynthesisError::Generation(e) => write!(f, "sql generation failed: {}", e),
            SqlSynthesisError::Extraction { .. } => {
                write!(f, "no executable sql could be extracted from model output")
            }
        }
    }
}

impl std::error::Error for SqlSynthesisError {}

/// Turns a free-text question into a SQL candidate: embed the question,
/// retrieve the closest schema records, prompt the generation model once,
/// extract a clean statement.
pub struct SqlSynthesizer {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    generation_provider: Arc<dyn GenerationProvider>,
    schema_index: Arc<dyn SchemaIndexRepository>,
    retrieval_k: usize,
}

impl SqlSynthesizer {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        generation_provider: Arc<dyn GenerationProvider>,
        schema_index: Arc<dyn SchemaIndexRepository>,
        retrieval_k: usize,
    ) -> Self {
        Self {
            embedding_provider,
            generation_provider,
            schema_index,
            retrieval_k,
        }
    }

    pub async fn synthesize(&self, question: &str) -> Result<SqlCandidate, SqlSynthesisError> {
        let question_embedding = self
            .embedding_provider
            .embed(question)
            .await
            .map_err(SqlSynthesisError::Embedding)?;

        let context = self
            .schema_index
            .nearest(&question_embedding, self.retrieval_k)
            .await
            .map_err(SqlSynthesisError::Index)?;

        if context.is_empty() {
            return Err(SqlSynthesisError::EmptySchemaContext);
        }

        let prompt = compose_prompt(question, &context);

        let raw = self
            .generation_provider
            .generate(&prompt)
            .await
            .map_err(SqlSynthesisError::Generation)?;

        let candidate = SqlCandidate::extract(&raw);
        tracing::info!(
            method = candidate.extraction_method.as_str(),
            "sql extracted from model output"
        );

        if candidate.is_extraction_failure() || candidate.extracted_statement.is_empty() {
            return Err(SqlSynthesisError::Extraction {
                raw_model_output: raw,
            });
        }

        Ok(candidate)
    }
}

/// Deterministic prompt: verbatim question, flattened schema records, fixed
/// formatting constraints.
pub(crate) fn compose_prompt(question: &str, context: &[SchemaEmbeddingRecord]) -> String {
    let schema = context
        .iter()
        .map(|record| record.descriptor_text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Convert the question to SQL.\n\
         - Question: {}\n\
         - Schema:\n{}\n\n\
         Respond with a single SQL statement inside a ```sql fenced code block. \
         Do not add explanations or any other prose.",
        question, schema
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pgvector::Vector;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    use crate::domain::entities::ExtractionMethod;
    use crate::domain::repositories::StoredEmbeddingPreview;

    struct FixedEmbedding;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vector, EmbeddingServiceError> {
            Ok(Vector::from(vec![0.1, 0.2, 0.3]))
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    struct CannedGeneration {
        response: String,
        called: AtomicBool,
    }

    impl CannedGeneration {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                called: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl GenerationProvider for CannedGeneration {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationServiceError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    struct StubIndex {
        records: Vec<SchemaEmbeddingRecord>,
    }

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
            Ok(self.records.clone())
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

    fn users_record() -> SchemaEmbeddingRecord {
        SchemaEmbeddingRecord {
            table_name: "users".to_string(),
            descriptor_text: "Table `users` Columns: id (INTEGER) PRI, name (TEXT) ".to_string(),
            embedding: Vector::from(vec![0.1, 0.2, 0.3]),
        }
    }

    #[tokio::test]
    async fn empty_retrieval_fails_before_generation() {
        let generation = Arc::new(CannedGeneration::new("should never run"));
        let synthesizer = SqlSynthesizer::new(
            Arc::new(FixedEmbedding),
            generation.clone(),
            Arc::new(StubIndex { records: vec![] }),
            4,
        );

        let result = synthesizer.synthesize("how many users?").await;

        assert!(matches!(result, Err(SqlSynthesisError::EmptySchemaContext)));
        assert!(!generation.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn fenced_model_output_yields_a_candidate() {
        let synthesizer = SqlSynthesizer::new(
            Arc::new(FixedEmbedding),
            Arc::new(CannedGeneration::new(
                "```sql\nSELECT COUNT(*) FROM users;\n```",
            )),
            Arc::new(StubIndex {
                records: vec![users_record()],
            }),
            4,
        );

        let candidate = synthesizer.synthesize("how many users?").await.unwrap();

        assert_eq!(candidate.extracted_statement, "select count(*) from users;");
        assert_eq!(candidate.extraction_method, ExtractionMethod::FencedBlock);
    }

    #[tokio::test]
    async fn unparseable_output_surfaces_as_extraction_failure() {
        let synthesizer = SqlSynthesizer::new(
            Arc::new(FixedEmbedding),
            Arc::new(CannedGeneration::new("I am unable to write queries.")),
            Arc::new(StubIndex {
                records: vec![users_record()],
            }),
            4,
        );

        let result = synthesizer.synthesize("how many users?").await;

        assert!(matches!(
            result,
            Err(SqlSynthesisError::Extraction { .. })
        ));
    }

    #[test]
    fn prompt_is_deterministic_and_contains_question_and_schema() {
        let records = vec![users_record()];

        let first = compose_prompt("how many users signed up?", &records);
        let second = compose_prompt("how many users signed up?", &records);

        assert_eq!(first, second);
        assert!(first.contains("- Question: how many users signed up?"));
        assert!(first.contains("Table `users` Columns:"));
        assert!(first.contains("```sql"));
    }
}
