pub mod chat_handler;
pub mod query_handler;
pub mod schema_handler;
pub mod tool_handler;

pub use chat_handler::ChatHandler;
pub use query_handler::QueryHandler;
pub use schema_handler::SchemaHandler;
pub use tool_handler::ToolHandler;
