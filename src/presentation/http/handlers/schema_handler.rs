use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::application::services::SchemaDescriptorBuilder;
use crate::application::use_cases::RefreshSchemaIndexUseCase;
use crate::domain::repositories::SchemaIndexRepository;
use crate::presentation::http::dto::{
    ApiResponse, EmbeddingPreviewDto, RefreshResponseDto, SchemaOverviewDto,
};

pub struct SchemaHandler {
    refresh_schema_use_case: Arc<RefreshSchemaIndexUseCase>,
    schema_builder: Arc<SchemaDescriptorBuilder>,
    schema_index: Arc<dyn SchemaIndexRepository>,
    preview_rows: usize,
}

impl SchemaHandler {
    pub fn new(
        refresh_schema_use_case: Arc<RefreshSchemaIndexUseCase>,
        schema_builder: Arc<SchemaDescriptorBuilder>,
        schema_index: Arc<dyn SchemaIndexRepository>,
        preview_rows: usize,
    ) -> Self {
        Self {
            refresh_schema_use_case,
            schema_builder,
            schema_index,
            preview_rows,
        }
    }

    pub async fn get_schema_overview(
        State(handler): State<Arc<SchemaHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.schema_builder.overview().await {
            Ok(schema) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(SchemaOverviewDto { schema })),
            )),
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "SCHEMA_INTROSPECTION_FAILED".to_string(),
                    e.to_string(),
                    None,
                )),
            )),
        }
    }

    pub async fn refresh_schema_index(
        State(handler): State<Arc<SchemaHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.refresh_schema_use_case.execute().await {
            Ok(tables) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(RefreshResponseDto { tables })),
            )),
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "SCHEMA_REFRESH_FAILED".to_string(),
                    e.to_string(),
                    None,
                )),
            )),
        }
    }

    pub async fn get_stored_embeddings(
        State(handler): State<Arc<SchemaHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .schema_index
            .stored_previews(handler.preview_rows as i64)
            .await
        {
            Ok(previews) => {
                let dtos: Vec<EmbeddingPreviewDto> =
                    previews.into_iter().map(EmbeddingPreviewDto::from).collect();
                Ok((StatusCode::OK, Json(ApiResponse::success(dtos))))
            }
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "SCHEMA_INDEX_ERROR".to_string(),
                    e.to_string(),
                    None,
                )),
            )),
        }
    }
}
