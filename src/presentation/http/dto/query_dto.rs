use serde::{Deserialize, Serialize};

use crate::application::use_cases::AskQuestionResponse;
use crate::domain::entities::ExtractionMethod;

#[derive(Debug, Deserialize)]
pub struct QueryRequestDto {
    pub question: String,
    #[serde(default)]
    pub summarize: bool,
    #[serde(default)]
    pub store_result: bool,
}

#[derive(Debug, Serialize)]
pub struct QueryResponseDto {
    pub statement: String,
    pub extraction_method: ExtractionMethod,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

impl From<AskQuestionResponse> for QueryResponseDto {
    fn from(response: AskQuestionResponse) -> Self {
        Self {
            statement: response.statement,
            extraction_method: response.extraction_method,
            columns: response.columns,
            rows: response.rows,
            row_count: response.row_count,
            analysis: response.analysis,
        }
    }
}
