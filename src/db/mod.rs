//! Database access for the DatabaseAgent server.
//!
//! The pipeline talks to the database through the [`SqlBackend`] seam:
//! dialect name for the prompt, live schema text, and verbatim execution.
//! The Postgres implementation lives in [`postgres`]; [`rows`] renders
//! result rows as JSON and [`statement`] classifies generated SQL for the
//! read-only warning.

pub mod postgres;
pub mod rows;
pub mod statement;

pub use postgres::PgBackend;

use async_trait::async_trait;

use crate::error::ToolResult;

/// One column in a table description.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

/// One foreign key edge out of a table.
#[derive(Debug, Clone)]
pub struct ForeignKeyInfo {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

/// Description of one table, rendered into the prompt's schema block.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

impl TableInfo {
    /// Render as a CREATE TABLE-style block.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.columns.len() + self.foreign_keys.len() + 1);
        for col in &self.columns {
            let mut line = format!("\t{} {}", col.name, col.sql_type);
            if !col.nullable {
                line.push_str(" NOT NULL");
            }
            lines.push(line);
        }

        let pk: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect();
        if !pk.is_empty() {
            lines.push(format!("\tPRIMARY KEY ({})", pk.join(", ")));
        }

        for fk in &self.foreign_keys {
            lines.push(format!(
                "\tFOREIGN KEY ({}) REFERENCES {}({})",
                fk.column, fk.foreign_table, fk.foreign_column
            ));
        }

        format!("CREATE TABLE {} (\n{}\n)", self.name, lines.join(",\n"))
    }
}

/// Render all tables for the prompt's schema section.
pub fn render_table_info(tables: &[TableInfo]) -> String {
    tables
        .iter()
        .map(TableInfo::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Database seam for the pipeline. Implementations own exactly one
/// invocation's connection; nothing is cached across calls.
#[async_trait]
pub trait SqlBackend: Send + Sync {
    /// Dialect name interpolated into the query-generation prompt.
    fn dialect(&self) -> &str;

    /// Describe the tables visible to generated queries.
    async fn table_info(&self) -> ToolResult<String>;

    /// Execute SQL verbatim and render the resulting rows as text.
    async fn run_query(&self, sql: &str) -> ToolResult<String>;
}
