use serde::Serialize;

/// One column of a table as reported by the relational store's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub declared_type: String,
    pub nullable: bool,
    /// "PRI" for primary key columns, empty otherwise.
    pub key_role: String,
    pub default: Option<String>,
    pub extra: String,
}

/// A foreign-key relation derived from catalog metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub local_column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// Complete structural description of one table. Built fresh on each
/// extraction run; a table either yields a complete descriptor or the whole
/// build fails.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDescriptor {
    pub table_name: String,
    pub column_specs: Vec<ColumnSpec>,
    pub relations: Vec<Relation>,
    pub row_count: i64,
    pub raw_definition: String,
}

impl SchemaDescriptor {
    /// Flattened human-readable rendering used both for embedding and for
    /// prompt context.
    pub fn descriptor_text(&self) -> String {
        let columns = self
            .column_specs
            .iter()
            .map(|col| format!("{} ({}) {}", col.name, col.declared_type, col.key_role))
            .collect::<Vec<_>>()
            .join(", ");

        let mut text = format!("Table `{}` Columns: {}", self.table_name, columns);

        if !self.relations.is_empty() {
            let relations = self
                .relations
                .iter()
                .map(|rel| {
                    format!(
                        "{} -> {}.{}",
                        rel.local_column, rel.referenced_table, rel.referenced_column
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            text.push_str(&format!(". Relationships: {}", relations));
        }

        text.push_str(&format!(
            ". Row Count: {}. CREATE Statement: {}",
            self.row_count, self.raw_definition
        ));

        text
    }

    /// Compact one-line rendering for the schema overview surface.
    pub fn overview_line(&self) -> String {
        let columns = self
            .column_specs
            .iter()
            .map(|col| format!("{} ({})", col.name, col.declared_type))
            .collect::<Vec<_>>()
            .join(", ");

        format!("{}: {}", self.table_name, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor_with_relations() -> SchemaDescriptor {
        SchemaDescriptor {
            table_name: "orders".to_string(),
            column_specs: vec![
                ColumnSpec {
                    name: "id".to_string(),
                    declared_type: "INTEGER".to_string(),
                    nullable: false,
                    key_role: "PRI".to_string(),
                    default: None,
                    extra: String::new(),
                },
                ColumnSpec {
                    name: "user_id".to_string(),
                    declared_type: "INTEGER".to_string(),
                    nullable: true,
                    key_role: String::new(),
                    default: None,
                    extra: String::new(),
                },
            ],
            relations: vec![Relation {
                local_column: "user_id".to_string(),
                referenced_table: "users".to_string(),
                referenced_column: "id".to_string(),
            }],
            row_count: 7,
            raw_definition: "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER)"
                .to_string(),
        }
    }

    #[test]
    fn descriptor_text_includes_columns_relations_and_count() {
        let text = descriptor_with_relations().descriptor_text();

        assert!(text.starts_with("Table `orders` Columns: id (INTEGER) PRI, user_id (INTEGER) "));
        assert!(text.contains("Relationships: user_id -> users.id"));
        assert!(text.contains("Row Count: 7"));
        assert!(text.contains("CREATE Statement: CREATE TABLE orders"));
    }

    #[test]
    fn descriptor_text_omits_relations_section_when_none() {
        let mut descriptor = descriptor_with_relations();
        descriptor.relations.clear();

        assert!(!descriptor.descriptor_text().contains("Relationships:"));
    }

    #[test]
    fn overview_line_groups_columns_by_table() {
        let line = descriptor_with_relations().overview_line();
        assert_eq!(line, "orders: id (INTEGER), user_id (INTEGER)");
    }
}
