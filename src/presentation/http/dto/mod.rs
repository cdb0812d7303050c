pub mod chat_dto;
pub mod query_dto;
pub mod response_dto;
pub mod schema_dto;

pub use chat_dto::{ChatRequestDto, ChatResponseDto, ToolCallRequestDto, ToolOutcomeDto};
pub use query_dto::{QueryRequestDto, QueryResponseDto};
pub use response_dto::{ApiResponse, HealthResponseDto};
pub use schema_dto::{EmbeddingPreviewDto, RefreshResponseDto, SchemaOverviewDto};
