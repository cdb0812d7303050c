pub mod conversation;
pub mod schema_descriptor;
pub mod sql_candidate;

pub use conversation::{ConversationTurn, Role, ToolInvocation, ToolName, ToolOutcome};
pub use schema_descriptor::{ColumnSpec, Relation, SchemaDescriptor};
pub use sql_candidate::{ExtractionMethod, SqlCandidate};
