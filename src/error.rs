//! Error types for dbutil.
//!
//! Every fallible call in the crate returns [`DbResult`].
//! Driver failures (sqlx, tiberius) are folded into [`DbError::Connection`] with a
//! suggestion so callers can decide whether to retry. Nothing in this crate retries
//! on its own.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Database '{name}' is not registered")]
    NotFound { name: String },

    #[error("Unsupported database type: {db_type}")]
    UnsupportedDialect { db_type: String },

    #[error("Operator already registered for database type: {db_type}")]
    DuplicateRegistration { db_type: String },

    #[error("Connection failed: {message}")]
    Connection {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("Cancelled: {operation}")]
    Cancelled { operation: String },
}

impl DbError {
    /// Create an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a not found error for a logical database name.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an unsupported dialect error.
    pub fn unsupported_dialect(db_type: impl Into<String>) -> Self {
        Self::UnsupportedDialect {
            db_type: db_type.into(),
        }
    }

    /// Create a duplicate registration error.
    pub fn duplicate_registration(db_type: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            db_type: db_type.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            sql_state: None,
            suggestion: suggestion.into(),
        }
    }

    /// Create a connection error carrying the server's SQL state.
    pub fn statement(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create a cancellation error.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::NotFound { .. } => Some("Open the database with its config before using it"),
            _ => None,
        }
    }

    /// Get the SQL state reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Connection { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    ///
    /// Statement errors carrying a SQL state are not retryable: the server
    /// understood and rejected the statement.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection { sql_state, .. } => sql_state.is_none(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::statement(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::RowNotFound => DbError::statement(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::PoolTimedOut => DbError::timeout("connection pool acquire", 30),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Open the database again")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => DbError::statement(
                format!("Column not found: {}", col),
                None,
                "Check the column names returned by the statement",
            ),
            sqlx::Error::ColumnDecode { index, source } => DbError::statement(
                format!("Failed to decode column {}: {}", index, source),
                None,
                "Cast the column to a text type in the statement",
            ),
            sqlx::Error::Decode(source) => DbError::statement(
                format!("Decode error: {}", source),
                None,
                "Cast the column to a text type in the statement",
            ),
            sqlx::Error::WorkerCrashed => DbError::connection(
                "Database worker crashed",
                "Open the database again",
            ),
            _ => DbError::connection(
                format!("Unknown database error: {}", err),
                "Check database driver configuration",
            ),
        }
    }
}

/// Convert tiberius (SQL Server) errors to DbError.
impl From<tiberius::error::Error> for DbError {
    fn from(err: tiberius::error::Error) -> Self {
        match err {
            tiberius::error::Error::Server(token) => DbError::statement(
                token.message().to_string(),
                Some(token.code().to_string()),
                "Check the SQL syntax and referenced objects",
            ),
            tiberius::error::Error::Io { kind, message } => DbError::connection(
                format!("I/O error ({:?}): {}", kind, message),
                "Check network connectivity and database server status",
            ),
            tiberius::error::Error::Tls(message) => DbError::connection(
                format!("TLS error: {}", message),
                "Verify TLS configuration or add TrustServerCertificate=true",
            ),
            tiberius::error::Error::Routing { host, port } => DbError::connection(
                format!("Server requested routing to {}:{}", host, port),
                "Connect to the routed host directly",
            ),
            other => DbError::connection(
                format!("SQL Server error: {}", other),
                "Check SQL Server connection settings",
            ),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
