use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::application::ports::{GenerationProvider, GenerationServiceError};
use crate::domain::entities::{ConversationTurn, Role, ToolInvocation};

static NL2SQL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)CALL_NL2SQL:\s*(.+?)\s*$").expect("nl2sql marker pattern"));
static SCHEMA_INFO_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CALL_GET_SCHEMA_INFO").expect("schema info marker pattern"));

/// Extracts tool-call intent from raw assistant text. Pluggable so a model
/// natively emitting typed tool calls can replace marker scanning without
/// touching the orchestrator state machine.
pub trait ToolCallDetector: Send + Sync {
    fn detect(&self, assistant_text: &str) -> Vec<ToolInvocation>;
}

/// Default detector: two independent pattern matchers over the literal
/// invocation markers the system prompt instructs the model to emit. The
/// nl2sql matcher finds all occurrences, not just the first.
pub struct MarkerToolCallDetector;

impl ToolCallDetector for MarkerToolCallDetector {
    fn detect(&self, assistant_text: &str) -> Vec<ToolInvocation> {
        let mut invocations = Vec::new();

        for captures in NL2SQL_MARKER.captures_iter(assistant_text) {
            if let Some(query) = captures.get(1) {
                invocations.push(ToolInvocation::nl2sql(query.as_str()));
            }
        }

        if SCHEMA_INFO_MARKER.is_match(assistant_text) {
            invocations.push(ToolInvocation::get_schema_info());
        }

        invocations
    }
}

/// Result of one AwaitingResponse -> Scanning pass: either a final assistant
/// message (no tool calls) or a list of invocations for external execution.
#[derive(Debug, Clone)]
pub struct ChatStep {
    pub message: String,
    pub tool_calls: Vec<ToolInvocation>,
}

#[derive(Debug)]
pub enum OrchestratorError {
    Generation(GenerationServiceError),
    /// The conversation already carries more tool rounds than the cap allows.
    RoundLimitExceeded { limit: usize },
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorError::Generation(e) => write!(f, "assistant generation failed: {}", e),
            OrchestratorError::RoundLimitExceeded { limit } => {
                write!(f, "tool round limit of {} exceeded", limit)
            }
        }
    }
}

impl std::error::Error for OrchestratorError {}

/// Conversational layer over the generation model. Holds no cross-request
/// state; each call takes the full conversation and produces one step.
pub struct ToolOrchestrator {
    generation_provider: Arc<dyn GenerationProvider>,
    detector: Arc<dyn ToolCallDetector>,
    max_tool_rounds: usize,
}

impl ToolOrchestrator {
    pub fn new(
        generation_provider: Arc<dyn GenerationProvider>,
        detector: Arc<dyn ToolCallDetector>,
        max_tool_rounds: usize,
    ) -> Self {
        Self {
            generation_provider,
            detector,
            max_tool_rounds,
        }
    }

    pub async fn respond(
        &self,
        turns: &[ConversationTurn],
    ) -> Result<ChatStep, OrchestratorError> {
        let tool_rounds = turns
            .iter()
            .filter(|turn| {
                turn.role == Role::System && turn.content.starts_with("Tool result from ")
            })
            .count();
        if tool_rounds >= self.max_tool_rounds {
            return Err(OrchestratorError::RoundLimitExceeded {
                limit: self.max_tool_rounds,
            });
        }

        let prompt = render_prompt(turns);
        let assistant_text = self
            .generation_provider
            .generate(&prompt)
            .await
            .map_err(OrchestratorError::Generation)?;

        let tool_calls = self.detector.detect(&assistant_text);
        tracing::debug!(tool_calls = tool_calls.len(), "assistant turn scanned");

        Ok(ChatStep {
            message: assistant_text,
            tool_calls,
        })
    }
}

/// System instructions advertising the two capabilities and their invocation
/// convention, followed by the conversation transcript.
fn render_prompt(turns: &[ConversationTurn]) -> String {
    let mut prompt = String::from(SYSTEM_INSTRUCTIONS);
    for turn in turns {
        prompt.push_str(&format!("\n{}: {}", turn.role.as_str(), turn.content));
    }
    prompt.push_str("\nassistant:");
    prompt
}

const SYSTEM_INSTRUCTIONS: &str = "\
You are a database assistant with two tools.\n\
To run a natural-language query against the database, emit a line:\n\
CALL_NL2SQL: <the question to answer>\n\
To inspect the database schema, emit a line:\n\
CALL_GET_SCHEMA_INFO\n\
Tool results will be provided back to you as system messages. \
If no tool is needed, answer directly.";
