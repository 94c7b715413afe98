//! SQL statement classification.
//!
//! Generated queries are executed verbatim, but statements that would
//! write or alter the database are logged before execution so operators
//! can see when the model strays from plain SELECTs.

use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// What a SQL statement would do if executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// SELECT and other statements that only read data.
    ReadOnly,
    /// INSERT, UPDATE, DELETE and friends.
    DmlWrite,
    /// CREATE, ALTER, DROP, TRUNCATE.
    Ddl,
    /// Transaction control.
    Transaction,
    /// CALL, EXECUTE, PREPARE.
    ProcedureCall,
    /// Session and maintenance commands.
    Administrative,
    /// Unparseable or unrecognized input.
    Unknown,
}

impl StatementKind {
    pub fn is_read_only(&self) -> bool {
        matches!(self, StatementKind::ReadOnly)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatementKind::ReadOnly => "read-only",
            StatementKind::DmlWrite => "dml-write",
            StatementKind::Ddl => "ddl",
            StatementKind::Transaction => "transaction",
            StatementKind::ProcedureCall => "procedure-call",
            StatementKind::Administrative => "administrative",
            StatementKind::Unknown => "unknown",
        }
    }
}

/// Classify a SQL string, taking the most impactful statement when the
/// input contains several.
pub fn classify_sql(sql: &str) -> StatementKind {
    let statements = match Parser::parse_sql(&PostgreSqlDialect {}, sql) {
        Ok(statements) => statements,
        Err(_) => return StatementKind::Unknown,
    };
    if statements.is_empty() {
        return StatementKind::Unknown;
    }

    for statement in &statements {
        let kind = classify_statement(statement);
        if !kind.is_read_only() {
            return kind;
        }
    }
    StatementKind::ReadOnly
}

fn classify_statement(statement: &Statement) -> StatementKind {
    match statement {
        Statement::Query(_) | Statement::ExplainTable { .. } => StatementKind::ReadOnly,
        // EXPLAIN inherits the kind of the statement it explains
        Statement::Explain { statement, .. } => classify_statement(statement),

        Statement::Insert(_)
        | Statement::Update { .. }
        | Statement::Delete(_)
        | Statement::Merge { .. }
        | Statement::Copy { .. } => StatementKind::DmlWrite,

        Statement::CreateTable { .. }
        | Statement::CreateView { .. }
        | Statement::CreateIndex(_)
        | Statement::CreateSchema { .. }
        | Statement::CreateDatabase { .. }
        | Statement::CreateFunction { .. }
        | Statement::CreateSequence { .. }
        | Statement::CreateExtension { .. }
        | Statement::AlterTable { .. }
        | Statement::AlterIndex { .. }
        | Statement::AlterView { .. }
        | Statement::Drop { .. }
        | Statement::DropFunction { .. }
        | Statement::Truncate { .. }
        | Statement::Comment { .. } => StatementKind::Ddl,

        Statement::StartTransaction { .. }
        | Statement::Commit { .. }
        | Statement::Rollback { .. }
        | Statement::Savepoint { .. }
        | Statement::ReleaseSavepoint { .. } => StatementKind::Transaction,

        Statement::Call { .. }
        | Statement::Execute { .. }
        | Statement::Prepare { .. }
        | Statement::Deallocate { .. } => StatementKind::ProcedureCall,

        Statement::Grant { .. }
        | Statement::Revoke { .. }
        | Statement::Set(_)
        | Statement::Vacuum { .. }
        | Statement::Analyze { .. }
        | Statement::Discard { .. }
        | Statement::LISTEN { .. }
        | Statement::UNLISTEN { .. }
        | Statement::NOTIFY { .. } => StatementKind::Administrative,

        _ => StatementKind::Unknown,
    }
}
