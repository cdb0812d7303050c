use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::SchemaHandler;

pub fn schema_routes(schema_handler: Arc<SchemaHandler>) -> Router {
    Router::new()
        .route("/schema", get(SchemaHandler::get_schema_overview))
        .route("/schema/refresh", post(SchemaHandler::refresh_schema_index))
        .route(
            "/schema/embeddings",
            get(SchemaHandler::get_stored_embeddings),
        )
        .with_state(schema_handler)
}
