use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::application::services::{QueryExecutorError, SqlSynthesisError};
use crate::application::use_cases::{AskQuestionError, AskQuestionRequest, AskQuestionUseCase};
use crate::presentation::http::dto::{ApiResponse, QueryRequestDto, QueryResponseDto};

pub struct QueryHandler {
    ask_question_use_case: Arc<AskQuestionUseCase>,
}

impl QueryHandler {
    pub fn new(ask_question_use_case: Arc<AskQuestionUseCase>) -> Self {
        Self {
            ask_question_use_case,
        }
    }

    pub async fn ask_question(
        State(handler): State<Arc<QueryHandler>>,
        Json(request): Json<QueryRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        if request.question.trim().is_empty() {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "EMPTY_QUESTION".to_string(),
                    "Question cannot be empty".to_string(),
                    None,
                )),
            ));
        }

        let use_case_request = AskQuestionRequest {
            question: request.question,
            summarize: request.summarize,
            store_result: request.store_result,
        };

        match handler.ask_question_use_case.execute(use_case_request).await {
            Ok(response) => {
                let dto = QueryResponseDto::from(response);
                Ok((
                    StatusCode::OK,
                    Json(ApiResponse::<QueryResponseDto>::success(dto)),
                ))
            }
            Err(e) => {
                let (status, code, details) = classify_ask_error(&e);
                Ok((
                    status,
                    Json(ApiResponse::error(code.to_string(), e.to_string(), details)),
                ))
            }
        }
    }
}

/// Splits failures into data errors the caller can act on (unprocessable),
/// upstream model failures (bad gateway), and everything else.
fn classify_ask_error(error: &AskQuestionError) -> (StatusCode, &'static str, Option<String>) {
    match error {
        AskQuestionError::Synthesis(e) => match e {
            SqlSynthesisError::Extraction { raw_model_output } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "SQL_EXTRACTION_FAILED",
                Some(raw_model_output.clone()),
            ),
            SqlSynthesisError::EmptySchemaContext => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_SCHEMA_CONTEXT",
                None,
            ),
            SqlSynthesisError::Embedding(_) => {
                (StatusCode::BAD_GATEWAY, "EMBEDDING_SERVICE_ERROR", None)
            }
            SqlSynthesisError::Generation(_) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_SERVICE_ERROR", None)
            }
            SqlSynthesisError::Index(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SCHEMA_INDEX_ERROR",
                None,
            ),
        },
        AskQuestionError::Execution(e) => match e {
            QueryExecutorError::Execution(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "QUERY_EXECUTION_FAILED",
                None,
            ),
            QueryExecutorError::Summarization(_) | QueryExecutorError::ResultEmbedding(_) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_SERVICE_ERROR", None)
            }
            QueryExecutorError::StoreUnreachable(_) | QueryExecutorError::ResultStorage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                None,
            ),
        },
    }
}
