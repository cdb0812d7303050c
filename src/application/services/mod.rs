pub mod query_executor;
pub mod schema_builder;
pub mod sql_synthesizer;
pub mod tool_orchestrator;

pub use query_executor::{ExecutionOptions, ExecutionOutcome, QueryExecutor, QueryExecutorError};
pub use schema_builder::{SchemaDescriptorBuilder, SchemaIntrospectionError};
pub use sql_synthesizer::{SqlSynthesisError, SqlSynthesizer};
pub use tool_orchestrator::{
    ChatStep, MarkerToolCallDetector, OrchestratorError, ToolCallDetector, ToolOrchestrator,
};
