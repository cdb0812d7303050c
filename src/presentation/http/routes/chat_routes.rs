use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::{ChatHandler, ToolHandler};

pub fn chat_routes(chat_handler: Arc<ChatHandler>) -> Router {
    Router::new()
        .route("/chat", post(ChatHandler::chat))
        .with_state(chat_handler)
}

pub fn tool_routes(tool_handler: Arc<ToolHandler>) -> Router {
    Router::new()
        .route("/tools", get(ToolHandler::list_tools))
        .route("/tools/call", post(ToolHandler::call_tool))
        .with_state(tool_handler)
}
