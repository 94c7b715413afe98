//! PostgreSQL backend.
//!
//! Connects per invocation, introspects the public schema into
//! CREATE TABLE-style descriptions for the query prompt, and executes
//! generated SQL verbatim.

use crate::config::redact_database_url;
use crate::db::rows::row_to_json;
use crate::db::{ColumnInfo, ForeignKeyInfo, SqlBackend, TableInfo, render_table_info};
use crate::error::{ToolError, ToolResult};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::debug;

pub const DIALECT_NAME: &str = "PostgreSQL";

const SCHEMA_NAME: &str = "public";
const CONNECT_TIMEOUT_SECS: u64 = 10;

mod queries {
    pub const LIST_TABLES: &str = r#"
        SELECT table_name
        FROM information_schema.tables
        WHERE table_schema = $1
        AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#;

    pub const DESCRIBE_COLUMNS: &str = r#"
        SELECT
            c.column_name,
            format_type(a.atttypid, a.atttypmod) as column_type,
            c.is_nullable,
            CASE WHEN pk.column_name IS NOT NULL THEN true ELSE false END as is_primary_key
        FROM information_schema.columns c
        JOIN pg_class t ON t.relname = c.table_name
        JOIN pg_namespace n ON n.oid = t.relnamespace AND n.nspname = c.table_schema
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attname = c.column_name
        LEFT JOIN (
            SELECT kcu.column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            WHERE tc.table_name = $1
            AND tc.table_schema = $2
            AND tc.constraint_type = 'PRIMARY KEY'
        ) pk ON c.column_name = pk.column_name
        WHERE c.table_name = $1 AND c.table_schema = $2
        ORDER BY c.ordinal_position
        "#;

    pub const DESCRIBE_FOREIGN_KEYS: &str = r#"
        SELECT
            kcu.column_name,
            ccu.table_name AS foreign_table_name,
            ccu.column_name AS foreign_column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON tc.constraint_name = kcu.constraint_name
            AND tc.table_schema = kcu.table_schema
        JOIN information_schema.constraint_column_usage ccu
            ON ccu.constraint_name = tc.constraint_name
            AND ccu.table_schema = tc.table_schema
        WHERE tc.table_name = $1
        AND tc.table_schema = $2
        AND tc.constraint_type = 'FOREIGN KEY'
        "#;
}

/// Live PostgreSQL connection for one tool invocation.
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    /// Connect to the database named by the connection URL.
    ///
    /// A single connection is enough here: each invocation runs its
    /// introspection and query sequentially.
    pub async fn connect(database_url: &str) -> ToolResult<Self> {
        debug!(url = %redact_database_url(database_url), "Connecting to PostgreSQL");

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    async fn fetch_tables(&self) -> ToolResult<Vec<String>> {
        let rows = sqlx::query(queries::LIST_TABLES)
            .bind(SCHEMA_NAME)
            .fetch_all(&self.pool)
            .await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            tables.push(row.try_get::<String, _>("table_name")?);
        }
        Ok(tables)
    }

    async fn fetch_columns(&self, table_name: &str) -> ToolResult<Vec<ColumnInfo>> {
        let rows = sqlx::query(queries::DESCRIBE_COLUMNS)
            .bind(table_name)
            .bind(SCHEMA_NAME)
            .fetch_all(&self.pool)
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let nullable: String = row.try_get("is_nullable")?;
            columns.push(ColumnInfo {
                name: row.try_get("column_name")?,
                sql_type: row.try_get("column_type")?,
                nullable: nullable == "YES",
                primary_key: row.try_get("is_primary_key")?,
            });
        }
        Ok(columns)
    }

    async fn fetch_foreign_keys(&self, table_name: &str) -> ToolResult<Vec<ForeignKeyInfo>> {
        let rows = sqlx::query(queries::DESCRIBE_FOREIGN_KEYS)
            .bind(table_name)
            .bind(SCHEMA_NAME)
            .fetch_all(&self.pool)
            .await?;

        let mut foreign_keys = Vec::with_capacity(rows.len());
        for row in &rows {
            foreign_keys.push(ForeignKeyInfo {
                column: row.try_get("column_name")?,
                foreign_table: row.try_get("foreign_table_name")?,
                foreign_column: row.try_get("foreign_column_name")?,
            });
        }
        Ok(foreign_keys)
    }
}

#[async_trait]
impl SqlBackend for PgBackend {
    fn dialect(&self) -> &str {
        DIALECT_NAME
    }

    async fn table_info(&self) -> ToolResult<String> {
        let table_names = self.fetch_tables().await?;

        let mut tables = Vec::with_capacity(table_names.len());
        for name in table_names {
            let columns = self.fetch_columns(&name).await?;
            let foreign_keys = self.fetch_foreign_keys(&name).await?;
            tables.push(TableInfo {
                name,
                columns,
                foreign_keys,
            });
        }

        debug!(count = tables.len(), schema = SCHEMA_NAME, "Described tables");
        Ok(render_table_info(&tables))
    }

    async fn run_query(&self, sql: &str) -> ToolResult<String> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        let decoded = rows.iter().map(row_to_json).collect::<Vec<_>>();
        debug!(rows = decoded.len(), "Executed query");

        serde_json::to_string(&decoded)
            .map_err(|e| ToolError::internal(format!("Failed to serialize rows: {e}")))
    }
}
