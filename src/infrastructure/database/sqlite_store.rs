use async_trait::async_trait;
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde_json::Value;
use std::sync::Mutex;

use crate::application::ports::{RelationalStore, RelationalStoreError, StatementResult};
use crate::domain::entities::{ColumnSpec, Relation};

/// SQLite-backed relational store. A single connection behind a mutex; the
/// store layer serializes concurrent access.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, RelationalStoreError> {
        let conn = Connection::open(path)
            .map_err(|e| RelationalStoreError::Unreachable(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, RelationalStoreError> {
        self.conn
            .lock()
            .map_err(|e| RelationalStoreError::Unreachable(e.to_string()))
    }
}

fn execution_error(e: rusqlite::Error) -> RelationalStoreError {
    RelationalStoreError::Execution(e.to_string())
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn value_ref_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(blob) => Value::String(format!("<blob {} bytes>", blob.len())),
    }
}

#[async_trait]
impl RelationalStore for SqliteStore {
    async fn list_tables(&self) -> Result<Vec<String>, RelationalStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(execution_error)?;

        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(execution_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(execution_error)?;

        Ok(tables)
    }

    async fn table_columns(&self, table: &str) -> Result<Vec<ColumnSpec>, RelationalStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
            .map_err(execution_error)?;

        let columns = stmt
            .query_map([], |row| {
                let notnull: i64 = row.get(3)?;
                let pk: i64 = row.get(5)?;
                Ok(ColumnSpec {
                    name: row.get(1)?,
                    declared_type: row.get(2)?,
                    nullable: notnull == 0,
                    key_role: if pk > 0 { "PRI".to_string() } else { String::new() },
                    default: row.get(4)?,
                    extra: String::new(),
                })
            })
            .map_err(execution_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(execution_error)?;

        if columns.is_empty() {
            return Err(RelationalStoreError::Execution(format!(
                "no such table: {}",
                table
            )));
        }

        Ok(columns)
    }

    async fn table_relations(&self, table: &str) -> Result<Vec<Relation>, RelationalStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("PRAGMA foreign_key_list({})", quote_ident(table)))
            .map_err(execution_error)?;

        let relations = stmt
            .query_map([], |row| {
                // `to` is NULL when the reference targets the parent's
                // primary key implicitly.
                let referenced_column: Option<String> = row.get(4)?;
                Ok(Relation {
                    local_column: row.get(3)?,
                    referenced_table: row.get(2)?,
                    referenced_column: referenced_column.unwrap_or_else(|| "id".to_string()),
                })
            })
            .map_err(execution_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(execution_error)?;

        Ok(relations)
    }

    async fn table_row_count(&self, table: &str) -> Result<i64, RelationalStoreError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )
        .map_err(execution_error)
    }

    async fn table_definition(&self, table: &str) -> Result<String, RelationalStoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .map_err(execution_error)
    }

    async fn run_statement(
        &self,
        statement: &str,
        max_rows: usize,
    ) -> Result<StatementResult, RelationalStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(statement).map_err(execution_error)?;

        if stmt.column_count() == 0 {
            let affected = stmt.execute([]).map_err(execution_error)?;
            return Ok(StatementResult {
                columns: Vec::new(),
                rows: Vec::new(),
                row_count: affected,
            });
        }

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut result_rows = stmt.query([]).map_err(execution_error)?;
        while let Some(row) = result_rows.next().map_err(execution_error)? {
            if rows.len() >= max_rows {
                break;
            }
            let mut values = Vec::with_capacity(column_count);
            for index in 0..column_count {
                let value = row.get_ref(index).map_err(execution_error)?;
                values.push(value_ref_to_json(value));
            }
            rows.push(values);
        }

        let row_count = rows.len();
        Ok(StatementResult {
            columns,
            rows,
            row_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded_store() -> SqliteStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (
                 id INTEGER PRIMARY KEY,
                 name TEXT NOT NULL,
                 email TEXT DEFAULT 'none'
             );
             CREATE TABLE orders (
                 id INTEGER PRIMARY KEY,
                 user_id INTEGER REFERENCES users(id),
                 amount REAL
             );
             INSERT INTO users (name) VALUES ('ada'), ('bob');
             INSERT INTO orders (user_id, amount) VALUES (1, 9.5), (1, 3.0), (2, 1.25);",
        )
        .unwrap();
        SqliteStore::from_connection(conn)
    }

    #[tokio::test]
    async fn lists_user_tables_in_order() {
        let store = seeded_store();
        let tables = store.list_tables().await.unwrap();
        assert_eq!(tables, vec!["orders", "users"]);
    }

    #[tokio::test]
    async fn reads_column_metadata_from_the_catalog() {
        let store = seeded_store();
        let columns = store.table_columns("users").await.unwrap();

        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].key_role, "PRI");
        assert_eq!(columns[1].name, "name");
        assert!(!columns[1].nullable);
        assert_eq!(columns[2].default.as_deref(), Some("'none'"));
    }

    #[tokio::test]
    async fn derives_relations_from_foreign_key_metadata() {
        let store = seeded_store();
        let relations = store.table_relations("orders").await.unwrap();

        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].local_column, "user_id");
        assert_eq!(relations[0].referenced_table, "users");
        assert_eq!(relations[0].referenced_column, "id");
    }

    #[tokio::test]
    async fn counts_rows_and_returns_the_create_statement() {
        let store = seeded_store();

        assert_eq!(store.table_row_count("orders").await.unwrap(), 3);
        let ddl = store.table_definition("users").await.unwrap();
        assert!(ddl.starts_with("CREATE TABLE users"));
    }

    #[tokio::test]
    async fn missing_table_is_an_execution_error() {
        let store = seeded_store();
        let result = store.table_columns("ghosts").await;
        assert!(matches!(result, Err(RelationalStoreError::Execution(_))));
    }

    #[tokio::test]
    async fn run_statement_returns_columns_and_rows() {
        let store = seeded_store();
        let result = store
            .run_statement("SELECT name FROM users ORDER BY name", 100)
            .await
            .unwrap();

        assert_eq!(result.columns, vec!["name"]);
        assert_eq!(result.rows, vec![vec![json!("ada")], vec![json!("bob")]]);
        assert_eq!(result.row_count, 2);
    }

    #[tokio::test]
    async fn run_statement_respects_the_row_cap() {
        let store = seeded_store();
        let result = store
            .run_statement("SELECT id FROM orders", 2)
            .await
            .unwrap();

        assert_eq!(result.row_count, 2);
        assert_eq!(result.rows.len(), 2);
    }

    #[tokio::test]
    async fn non_query_statements_report_affected_rows() {
        let store = seeded_store();
        let result = store
            .run_statement("UPDATE orders SET amount = 0 WHERE user_id = 1", 100)
            .await
            .unwrap();

        assert!(result.columns.is_empty());
        assert_eq!(result.row_count, 2);
    }

    #[tokio::test]
    async fn invalid_sql_is_an_execution_error() {
        let store = seeded_store();
        let result = store.run_statement("SELEC wrong", 100).await;
        assert!(matches!(result, Err(RelationalStoreError::Execution(_))));
    }
}
