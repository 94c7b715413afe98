//! Error types for the MCP agent tool servers.
//!
//! This module defines all error types using `thiserror`. Errors are typed
//! internally, but both tools render them into their in-band error channel
//! (the report string of `send_email`, the `error` field of `database_agent`)
//! instead of surfacing protocol-level failures to the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    /// A required environment-sourced value is absent or empty.
    /// The message names the variable(s) exactly as callers expect them.
    #[error("{message}")]
    MissingConfig { message: String },

    #[error("Invalid mail message: {message}")]
    MailMessage { message: String },

    #[error("SMTP transport failed: {message}")]
    Smtp { message: String },

    #[error("Model request failed: {message}")]
    ModelRequest { message: String },

    #[error("Malformed model output: {message}")]
    ModelOutput { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42703" for undefined column
        sql_state: Option<String>,
    },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ToolError {
    /// Missing single environment variable, original wording preserved.
    pub fn missing_env(name: &str) -> Self {
        Self::MissingConfig {
            message: format!("{} environment variable is required", name),
        }
    }

    /// Missing credential pair, reported jointly regardless of which half is absent.
    pub fn missing_env_pair(first: &str, second: &str) -> Self {
        Self::MissingConfig {
            message: format!("{} and {} environment variables are required", first, second),
        }
    }

    /// Create a mail message construction error.
    pub fn mail_message(message: impl Into<String>) -> Self {
        Self::MailMessage {
            message: message.into(),
        }
    }

    /// Create an SMTP transport error.
    pub fn smtp(message: impl Into<String>) -> Self {
        Self::Smtp {
            message: message.into(),
        }
    }

    /// Create a model request error.
    pub fn model_request(message: impl Into<String>) -> Self {
        Self::ModelRequest {
            message: message.into(),
        }
    }

    /// Create a malformed model output error.
    pub fn model_output(message: impl Into<String>) -> Self {
        Self::ModelOutput {
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True when the failure happened before any external call was issued.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingConfig { .. })
    }
}

/// Convert sqlx errors to ToolError.
impl From<sqlx::Error> for ToolError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => ToolError::connection(msg.to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                ToolError::database(db_err.message(), code)
            }
            sqlx::Error::RowNotFound => ToolError::database("No rows returned", None),
            sqlx::Error::PoolTimedOut => {
                ToolError::connection("Connection pool acquire timed out")
            }
            sqlx::Error::PoolClosed => ToolError::connection("Connection pool is closed"),
            sqlx::Error::Io(io_err) => ToolError::connection(format!("I/O error: {}", io_err)),
            sqlx::Error::Tls(tls_err) => ToolError::connection(format!("TLS error: {}", tls_err)),
            sqlx::Error::Protocol(msg) => {
                ToolError::connection(format!("Protocol error: {}", msg))
            }
            sqlx::Error::ColumnNotFound(col) => {
                ToolError::database(format!("Column not found: {}", col), None)
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => ToolError::internal(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                ToolError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => ToolError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => ToolError::internal("Database worker crashed"),
            _ => ToolError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Convert model-client HTTP errors to ToolError.
impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ToolError::model_request(format!("request timed out: {}", err))
        } else {
            ToolError::model_request(err.to_string())
        }
    }
}

/// Convert SMTP transport errors to ToolError.
impl From<lettre::transport::smtp::Error> for ToolError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        ToolError::smtp(err.to_string())
    }
}

/// Convert message construction errors to ToolError.
impl From<lettre::error::Error> for ToolError {
    fn from(err: lettre::error::Error) -> Self {
        ToolError::mail_message(err.to_string())
    }
}

/// Convert mailbox parse errors to ToolError.
impl From<lettre::address::AddressError> for ToolError {
    fn from(err: lettre::address::AddressError) -> Self {
        ToolError::mail_message(format!("invalid address: {}", err))
    }
}

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
