use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::application::use_cases::{ExecuteToolError, ExecuteToolUseCase, capabilities};
use crate::presentation::http::dto::{ApiResponse, ToolCallRequestDto, ToolOutcomeDto};

pub struct ToolHandler {
    execute_tool_use_case: Arc<ExecuteToolUseCase>,
}

impl ToolHandler {
    pub fn new(execute_tool_use_case: Arc<ExecuteToolUseCase>) -> Self {
        Self {
            execute_tool_use_case,
        }
    }

    pub async fn list_tools(
        State(_handler): State<Arc<ToolHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        Ok((StatusCode::OK, Json(ApiResponse::success(capabilities()))))
    }

    pub async fn call_tool(
        State(handler): State<Arc<ToolHandler>>,
        Json(request): Json<ToolCallRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .execute_tool_use_case
            .dispatch(&request.tool_name, request.arguments)
            .await
        {
            Ok(outcome) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(ToolOutcomeDto::from(outcome))),
            )),
            Err(e @ ExecuteToolError::UnknownTool(_)) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "UNKNOWN_TOOL".to_string(),
                    e.to_string(),
                    None,
                )),
            )),
            Err(e @ ExecuteToolError::MissingArgument(_)) => Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "MISSING_ARGUMENT".to_string(),
                    e.to_string(),
                    None,
                )),
            )),
        }
    }
}
