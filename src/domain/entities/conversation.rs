use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of the conversation. The orchestrator may append synthetic system
/// turns carrying tool results before generating the next assistant turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolName {
    #[serde(rename = "nl2sql")]
    Nl2Sql,
    #[serde(rename = "get_schema_info")]
    GetSchemaInfo,
}

impl ToolName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Nl2Sql => "nl2sql",
            ToolName::GetSchemaInfo => "get_schema_info",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "nl2sql" => Some(ToolName::Nl2Sql),
            "get_schema_info" => Some(ToolName::GetSchemaInfo),
            _ => None,
        }
    }
}

/// A structured request, inferred from assistant text, to invoke a named
/// capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_name: ToolName,
    pub arguments: serde_json::Value,
}

impl ToolInvocation {
    pub fn nl2sql(question: impl Into<String>) -> Self {
        Self {
            tool_name: ToolName::Nl2Sql,
            arguments: serde_json::json!({ "question": question.into() }),
        }
    }

    pub fn get_schema_info() -> Self {
        Self {
            tool_name: ToolName::GetSchemaInfo,
            arguments: serde_json::json!({}),
        }
    }
}

/// Result of executing one tool invocation. Not persisted beyond the current
/// exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub tool_name: ToolName,
    pub output: serde_json::Value,
}

impl ToolOutcome {
    /// Rendering used when a tool result is folded back into the
    /// conversation as a synthetic system turn.
    pub fn as_system_turn(&self) -> ConversationTurn {
        ConversationTurn::system(format!(
            "Tool result from {}: {}",
            self.tool_name.as_str(),
            self.output
        ))
    }
}
