use serde::Serialize;

use crate::application::use_cases::TableRefreshSummary;
use crate::domain::repositories::StoredEmbeddingPreview;

#[derive(Debug, Serialize)]
pub struct SchemaOverviewDto {
    pub schema: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponseDto {
    pub tables: Vec<TableRefreshSummary>,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingPreviewDto {
    pub table_name: String,
    pub dimension: usize,
    pub preview: Vec<f32>,
}

impl From<StoredEmbeddingPreview> for EmbeddingPreviewDto {
    fn from(preview: StoredEmbeddingPreview) -> Self {
        Self {
            table_name: preview.table_name,
            dimension: preview.dimension,
            preview: preview.preview,
        }
    }
}
