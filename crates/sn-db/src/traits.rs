//! Database trait definitions
//!
//! The refresh engine needs two capabilities from a database: running
//! pre-formatted SQL text (optionally inside a transaction) and reading and
//! writing the persisted per-node state. They are separate traits so that
//! each can be implemented and tested on its own; [`Database`] is the union.

use crate::error::DbResult;
use crate::state::{NodeState, PipelineId};
use async_trait::async_trait;

/// An open transaction on one connection.
///
/// Callers must finish with [`commit`](Self::commit) or
/// [`rollback`](Self::rollback).
#[async_trait]
pub trait DbTransaction: Send {
    /// Execute SQL text inside the transaction
    async fn execute(&mut self, sql: &str) -> DbResult<()>;

    /// Commit all statements executed so far
    async fn commit(self: Box<Self>) -> DbResult<()>;

    /// Discard all statements executed so far
    async fn rollback(self: Box<Self>) -> DbResult<()>;
}

/// Statement execution against one database handle.
///
/// SQL passed here is configuration-authored DDL/DML text and is executed
/// verbatim, without parameter binding. A single call may contain several
/// statements or a procedural block.
#[async_trait]
pub trait DatabaseCore: Send + Sync {
    /// Execute SQL outside any explicit transaction
    async fn execute(&self, sql: &str) -> DbResult<()>;

    /// Begin a transaction
    async fn begin<'a>(&'a self) -> DbResult<Box<dyn DbTransaction + 'a>>;

    /// Run `statements` in order inside one transaction, calling
    /// `after_each` once each statement succeeds. Rolls back on the first failure.
    async fn execute_in_transaction(
        &self,
        statements: &[String],
        after_each: &(dyn Fn() + Send + Sync),
    ) -> DbResult<()> {
        let mut tx = self.begin().await?;
        for sql in statements {
            log::debug!("Running SQL: {}", sql);
            if let Err(e) = tx.execute(sql).await {
                if let Err(rollback) = tx.rollback().await {
                    log::warn!("Rollback after failed statement also failed: {}", rollback);
                }
                return Err(e);
            }
            after_each();
        }
        tx.commit().await
    }
}

/// Access to the persisted node state tables.
///
/// The tables are provisioned externally; pipelines are registered by name
/// before any refresh runs.
#[async_trait]
pub trait DatabaseState: Send + Sync {
    /// Resolve a registered pipeline by name
    async fn find_pipeline(&self, name: &str) -> DbResult<Option<PipelineId>>;

    /// Load every node state row recorded for a pipeline
    async fn load_node_states(&self, pipeline: PipelineId) -> DbResult<Vec<NodeState>>;

    /// Insert or replace the row for `(state.pipeline, state.name)`
    async fn upsert_node_state(&self, state: &NodeState) -> DbResult<()>;

    /// Remove the row for `(pipeline, name)`
    async fn delete_node_state(&self, pipeline: PipelineId, name: &str) -> DbResult<()>;
}

/// Full database capability required by the refresh engine
pub trait Database: DatabaseCore + DatabaseState {}

impl<T: DatabaseCore + DatabaseState + ?Sized> Database for T {}
