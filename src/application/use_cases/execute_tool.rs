use serde_json::json;
use std::sync::Arc;

use crate::application::services::SchemaDescriptorBuilder;
use crate::application::use_cases::ask_question::{AskQuestionRequest, AskQuestionUseCase};
use crate::domain::entities::{ToolName, ToolOutcome};

/// Static description of one callable capability, consumed by the
/// conversational front end to advertise available tools.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Capability {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
}

pub fn capabilities() -> Vec<Capability> {
    vec![
        Capability {
            name: "nl2sql",
            description: "Convert a natural-language question to SQL, run it against the \
                          database, and return the rows.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "question": { "type": "string" }
                },
                "required": ["question"]
            }),
        },
        Capability {
            name: "get_schema_info",
            description: "Return the structure of every table in the database.",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

#[derive(Debug)]
pub enum ExecuteToolError {
    UnknownTool(String),
    MissingArgument(&'static str),
}

impl std::fmt::Display for ExecuteToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteToolError::UnknownTool(name) => write!(f, "unknown tool: {}", name),
            ExecuteToolError::MissingArgument(name) => {
                write!(f, "missing required argument: {}", name)
            }
        }
    }
}

impl std::error::Error for ExecuteToolError {}

/// Tool execution surface: accepts one invocation, dispatches to the
/// matching capability, returns one outcome. Tool-level failures are folded
/// into the outcome payload; only an unknown tool or malformed arguments are
/// surfaced as errors.
pub struct ExecuteToolUseCase {
    ask_question: Arc<AskQuestionUseCase>,
    schema_builder: Arc<SchemaDescriptorBuilder>,
}

impl ExecuteToolUseCase {
    pub fn new(
        ask_question: Arc<AskQuestionUseCase>,
        schema_builder: Arc<SchemaDescriptorBuilder>,
    ) -> Self {
        Self {
            ask_question,
            schema_builder,
        }
    }

    /// Sole authority on tool names: anything `ToolName::parse` does not
    /// recognize is rejected here, not by callers.
    pub async fn dispatch(
        &self,
        tool_name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolOutcome, ExecuteToolError> {
        let Some(tool) = ToolName::parse(tool_name) else {
            return Err(ExecuteToolError::UnknownTool(tool_name.to_string()));
        };

        match tool {
            ToolName::Nl2Sql => {
                let question = arguments
                    .get("question")
                    .and_then(|v| v.as_str())
                    .ok_or(ExecuteToolError::MissingArgument("question"))?
                    .to_string();

                let request = AskQuestionRequest {
                    question,
                    summarize: false,
                    store_result: false,
                };

                let output = match self.ask_question.execute(request).await {
                    Ok(response) => json!({
                        "statement": response.statement,
                        "extraction_method": response.extraction_method,
                        "columns": response.columns,
                        "rows": response.rows,
                        "row_count": response.row_count,
                    }),
                    Err(e) => json!({ "error": e.to_string() }),
                };

                Ok(ToolOutcome {
                    tool_name: ToolName::Nl2Sql,
                    output,
                })
            }
            ToolName::GetSchemaInfo => {
                let output = match self.schema_builder.overview().await {
                    Ok(overview) => json!({ "schema": overview }),
                    Err(e) => json!({ "error": e.to_string() }),
                };

                Ok(ToolOutcome {
                    tool_name: ToolName::GetSchemaInfo,
                    output,
                })
            }
        }
    }
}
