use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::{ColumnSpec, Relation};

/// Rows fetched from a statement, with column names in result order.
#[derive(Debug, Clone)]
pub struct StatementResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Rows affected for non-query statements, rows fetched otherwise.
    pub row_count: usize,
}

#[derive(Debug)]
pub enum RelationalStoreError {
    /// The store could not be opened or reached.
    Unreachable(String),
    /// A statement or catalog read failed inside the store.
    Execution(String),
}

impl std::fmt::Display for RelationalStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationalStoreError::Unreachable(msg) => {
                write!(f, "relational store unreachable: {}", msg)
            }
            RelationalStoreError::Execution(msg) => write!(f, "statement failed: {}", msg),
        }
    }
}

impl std::error::Error for RelationalStoreError {}

/// Data-access contract of the target relational store: catalog metadata
/// reads plus verbatim statement execution.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    async fn list_tables(&self) -> Result<Vec<String>, RelationalStoreError>;

    async fn table_columns(&self, table: &str) -> Result<Vec<ColumnSpec>, RelationalStoreError>;

    /// Foreign-key relations from catalog metadata, never naming conventions.
    async fn table_relations(&self, table: &str) -> Result<Vec<Relation>, RelationalStoreError>;

    async fn table_row_count(&self, table: &str) -> Result<i64, RelationalStoreError>;

    async fn table_definition(&self, table: &str) -> Result<String, RelationalStoreError>;

    /// Runs `statement` verbatim, fetching at most `max_rows` rows.
    async fn run_statement(
        &self,
        statement: &str,
        max_rows: usize,
    ) -> Result<StatementResult, RelationalStoreError>;
}
