//! Error types for sn-refresh

use sn_core::CoreError;
use sn_db::DbError;
use thiserror::Error;

/// Refresh run errors
///
/// Any error aborts the rest of the run. Nodes finished before the failure
/// stay applied; running the refresh again picks up where it stopped.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// Pipeline missing from the state store (R001)
    #[error("[R001] Pipeline '{0}' is not registered in the state store")]
    PipelineNotRegistered(String),

    /// A node's SQL failed (R002)
    #[error("[R002] Node '{node}' failed: {source}")]
    Node {
        node: String,
        #[source]
        source: DbError,
    },

    /// Reading or writing node state failed (R003)
    #[error("[R003] {0}")]
    State(#[from] DbError),

    /// Pipeline definition error (R004)
    #[error("[R004] {0}")]
    Config(#[from] CoreError),
}

/// Result type alias for RefreshError
pub type RefreshResult<T> = Result<T, RefreshError>;

impl RefreshError {
    pub(crate) fn node(node: &str) -> impl FnOnce(DbError) -> RefreshError + '_ {
        move |source| RefreshError::Node {
            node: node.to_string(),
            source,
        }
    }
}
