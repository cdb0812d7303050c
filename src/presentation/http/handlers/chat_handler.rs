use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::application::services::{OrchestratorError, ToolOrchestrator};
use crate::presentation::http::dto::{ApiResponse, ChatRequestDto, ChatResponseDto};

pub struct ChatHandler {
    tool_orchestrator: Arc<ToolOrchestrator>,
}

impl ChatHandler {
    pub fn new(tool_orchestrator: Arc<ToolOrchestrator>) -> Self {
        Self { tool_orchestrator }
    }

    pub async fn chat(
        State(handler): State<Arc<ChatHandler>>,
        Json(request): Json<ChatRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        if request.turns.is_empty() {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "EMPTY_CONVERSATION".to_string(),
                    "Conversation must contain at least one turn".to_string(),
                    None,
                )),
            ));
        }

        match handler.tool_orchestrator.respond(&request.turns).await {
            Ok(step) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(ChatResponseDto::from(step))),
            )),
            Err(e @ OrchestratorError::RoundLimitExceeded { .. }) => Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::error(
                    "TOOL_ROUND_LIMIT".to_string(),
                    e.to_string(),
                    None,
                )),
            )),
            Err(e @ OrchestratorError::Generation(_)) => Ok((
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::error(
                    "GENERATION_SERVICE_ERROR".to_string(),
                    e.to_string(),
                    None,
                )),
            )),
        }
    }
}
