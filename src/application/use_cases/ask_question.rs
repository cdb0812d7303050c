use std::sync::Arc;

use crate::application::services::{
    ExecutionOptions, QueryExecutor, QueryExecutorError, SqlSynthesisError, SqlSynthesizer,
};
use crate::domain::entities::ExtractionMethod;

#[derive(Debug, Clone)]
pub struct AskQuestionRequest {
    pub question: String,
    pub summarize: bool,
    pub store_result: bool,
}

#[derive(Debug, Clone)]
pub struct AskQuestionResponse {
    pub statement: String,
    pub extraction_method: ExtractionMethod,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
    pub analysis: Option<String>,
}

#[derive(Debug)]
pub enum AskQuestionError {
    Synthesis(SqlSynthesisError),
    Execution(QueryExecutorError),
}

impl std::fmt::Display for AskQuestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AskQuestionError::Synthesis(e) => write!(f, "{}", e),
            AskQuestionError::Execution(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AskQuestionError {}

/// The full question-to-answer round trip: synthesize a statement, then run
/// it. A failed extraction short-circuits before execution; the system never
/// runs a statement it has not successfully extracted.
pub struct AskQuestionUseCase {
    synthesizer: Arc<SqlSynthesizer>,
    executor: Arc<QueryExecutor>,
}

impl AskQuestionUseCase {
    pub fn new(synthesizer: Arc<SqlSynthesizer>, executor: Arc<QueryExecutor>) -> Self {
        Self {
            synthesizer,
            executor,
        }
    }

    pub async fn execute(
        &self,
        request: AskQuestionRequest,
    ) -> Result<AskQuestionResponse, AskQuestionError> {
        let candidate = self
            .synthesizer
            .synthesize(&request.question)
            .await
            .map_err(AskQuestionError::Synthesis)?;

        let options = ExecutionOptions {
            store_result: request.store_result,
            summarize: request.summarize,
        };

        let outcome = self
            .executor
            .execute(&candidate.extracted_statement, options)
            .await
            .map_err(AskQuestionError::Execution)?;

        Ok(AskQuestionResponse {
            statement: outcome.statement,
            extraction_method: candidate.extraction_method,
            columns: outcome.columns,
            rows: outcome.rows,
            row_count: outcome.row_count,
            analysis: outcome.analysis,
        })
    }
}
