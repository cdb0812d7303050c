use serde::{Deserialize, Serialize};

use crate::application::services::ChatStep;
use crate::domain::entities::{ConversationTurn, ToolInvocation, ToolOutcome};

#[derive(Debug, Deserialize)]
pub struct ChatRequestDto {
    pub turns: Vec<ConversationTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseDto {
    pub message: String,
    pub tool_calls: Vec<ToolInvocation>,
}

impl From<ChatStep> for ChatResponseDto {
    fn from(step: ChatStep) -> Self {
        Self {
            message: step.message,
            tool_calls: step.tool_calls,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToolCallRequestDto {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ToolOutcomeDto {
    pub tool_name: String,
    pub output: serde_json::Value,
    /// Ready-to-append system turn; feeding it back into the next /chat call
    /// is what makes the orchestrator see the tool round.
    pub system_turn: ConversationTurn,
}

impl From<ToolOutcome> for ToolOutcomeDto {
    fn from(outcome: ToolOutcome) -> Self {
        let system_turn = outcome.as_system_turn();
        Self {
            tool_name: outcome.tool_name.as_str().to_string(),
            output: outcome.output,
            system_turn,
        }
    }
}
