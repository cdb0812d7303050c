pub mod ask_question;
pub mod execute_tool;
pub mod refresh_schema_index;

pub use ask_question::{AskQuestionError, AskQuestionRequest, AskQuestionResponse, AskQuestionUseCase};
pub use execute_tool::{Capability, ExecuteToolError, ExecuteToolUseCase, capabilities};
pub use refresh_schema_index::{
    RefreshSchemaIndexError, RefreshSchemaIndexUseCase, TableRefreshSummary,
};
