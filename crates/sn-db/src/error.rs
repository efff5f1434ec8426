//! Error types for sn-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {message}\n  while running: {sql}")]
    ExecutionError { message: String, sql: String },

    /// Transaction control error (D003)
    #[error("[D003] Transaction failed: {0}")]
    TransactionError(String),

    /// Persisted state read/write error (D004)
    #[error("[D004] Node state query failed: {0}")]
    StateError(String),

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Build an execution error, keeping only the first line of long scripts in the message.
    pub fn execution(message: impl Into<String>, sql: &str) -> Self {
        DbError::ExecutionError {
            message: message.into(),
            sql: abbreviate(sql),
        }
    }
}

/// Collapse a statement to a single trimmed line for error messages.
fn abbreviate(sql: &str) -> String {
    const MAX: usize = 200;
    let flat: String = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > MAX {
        let cut: String = flat.chars().take(MAX).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

/// Describe a driver error, preferring the server's message when there is one.
pub(crate) fn describe_pg_error(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => format!("{}: {}", db.severity(), db.message()),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_flattens_sql() {
        let err = DbError::execution("boom", "create view\n   d.a as\n  select 1;");
        assert_eq!(
            err.to_string(),
            "[D002] SQL execution failed: boom\n  while running: create view d.a as select 1;"
        );
    }

    #[test]
    fn test_execution_error_truncates_long_sql() {
        let sql = "x".repeat(500);
        match DbError::execution("boom", &sql) {
            DbError::ExecutionError { sql, .. } => {
                assert!(sql.ends_with("..."));
                assert_eq!(sql.len(), 203);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
