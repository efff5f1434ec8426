//! In-memory recording backend for exercising the refresh engine without a server.
//!
//! Every statement is recorded in execution order together with the
//! transaction it ran in and how that transaction ended. Node state rows live
//! in a map keyed by `(pipeline, name)`.

use crate::error::{DbError, DbResult};
use crate::state::{NodeState, PipelineId};
use crate::traits::{DatabaseCore, DatabaseState, DbTransaction};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// How a recorded statement ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Ran outside any transaction
    Autocommit,
    /// Transaction still open
    Pending,
    Committed,
    RolledBack,
    /// The statement itself failed
    Failed,
}

/// One statement seen by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedStatement {
    pub sql: String,
    /// Transaction sequence number, `None` outside a transaction
    pub transaction: Option<usize>,
    pub outcome: Outcome,
}

#[derive(Default)]
struct Inner {
    statements: Vec<ExecutedStatement>,
    pipelines: HashMap<String, PipelineId>,
    states: BTreeMap<(PipelineId, String), NodeState>,
    fail_on: Vec<String>,
    next_transaction: usize,
}

impl Inner {
    fn check_failure(&self, sql: &str) -> DbResult<()> {
        match self.fail_on.iter().find(|pattern| sql.contains(pattern.as_str())) {
            Some(pattern) => Err(DbError::execution(
                format!("injected failure on '{}'", pattern),
                sql,
            )),
            None => Ok(()),
        }
    }

    fn finish_transaction(&mut self, id: usize, outcome: Outcome) {
        for statement in &mut self.statements {
            if statement.transaction == Some(id) && statement.outcome == Outcome::Pending {
                statement.outcome = outcome;
            }
        }
    }
}

/// Recording database backend
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn snapshot(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a pipeline by name, returning its id. Registering twice returns the same id.
    pub fn register_pipeline(&self, name: &str) -> PipelineId {
        let mut inner = self.snapshot();
        let next = PipelineId(inner.pipelines.len() as i64 + 1);
        *inner.pipelines.entry(name.to_string()).or_insert(next)
    }

    /// Make every later statement containing `pattern` fail.
    pub fn fail_on(&self, pattern: &str) {
        self.snapshot().fail_on.push(pattern.to_string());
    }

    pub fn clear_failures(&self) {
        self.snapshot().fail_on.clear();
    }

    /// Forget recorded statements; state rows are kept.
    pub fn clear_statements(&self) {
        self.snapshot().statements.clear();
    }

    /// Every statement seen so far, in execution order
    pub fn statements(&self) -> Vec<ExecutedStatement> {
        self.snapshot().statements.clone()
    }

    /// SQL text of statements whose effects are durable
    pub fn committed(&self) -> Vec<String> {
        self.snapshot()
            .statements
            .iter()
            .filter(|s| matches!(s.outcome, Outcome::Autocommit | Outcome::Committed))
            .map(|s| s.sql.clone())
            .collect()
    }

    /// State rows of one pipeline, ordered by name
    pub fn states(&self, pipeline: PipelineId) -> Vec<NodeState> {
        self.snapshot()
            .states
            .values()
            .filter(|s| s.pipeline == pipeline)
            .cloned()
            .collect()
    }

    /// Seed a state row directly, bypassing the engine
    pub fn insert_state(&self, state: NodeState) {
        self.snapshot()
            .states
            .insert((state.pipeline, state.name.clone()), state);
    }
}

struct MemoryTransaction<'a> {
    backend: &'a MemoryBackend,
    id: usize,
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        // An open transaction ends when its handle goes away; finished ones
        // have no pending statements left
        self.backend
            .snapshot()
            .finish_transaction(self.id, Outcome::RolledBack);
    }
}

#[async_trait]
impl DbTransaction for MemoryTransaction<'_> {
    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        let mut inner = self.backend.lock()?;
        let result = inner.check_failure(sql);
        inner.statements.push(ExecutedStatement {
            sql: sql.to_string(),
            transaction: Some(self.id),
            outcome: if result.is_ok() {
                Outcome::Pending
            } else {
                Outcome::Failed
            },
        });
        result
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        self.backend
            .lock()?
            .finish_transaction(self.id, Outcome::Committed);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        self.backend
            .lock()?
            .finish_transaction(self.id, Outcome::RolledBack);
        Ok(())
    }
}

#[async_trait]
impl DatabaseCore for MemoryBackend {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        let mut inner = self.lock()?;
        let result = inner.check_failure(sql);
        inner.statements.push(ExecutedStatement {
            sql: sql.to_string(),
            transaction: None,
            outcome: if result.is_ok() {
                Outcome::Autocommit
            } else {
                Outcome::Failed
            },
        });
        result
    }

    async fn begin<'a>(&'a self) -> DbResult<Box<dyn DbTransaction + 'a>> {
        let mut inner = self.lock()?;
        inner.next_transaction += 1;
        let id = inner.next_transaction;
        Ok(Box::new(MemoryTransaction { backend: self, id }))
    }
}

#[async_trait]
impl DatabaseState for MemoryBackend {
    async fn find_pipeline(&self, name: &str) -> DbResult<Option<PipelineId>> {
        Ok(self.lock()?.pipelines.get(name).copied())
    }

    async fn load_node_states(&self, pipeline: PipelineId) -> DbResult<Vec<NodeState>> {
        Ok(self
            .lock()?
            .states
            .values()
            .filter(|s| s.pipeline == pipeline)
            .cloned()
            .collect())
    }

    async fn upsert_node_state(&self, state: &NodeState) -> DbResult<()> {
        self.lock()?
            .states
            .insert((state.pipeline, state.name.clone()), state.clone());
        Ok(())
    }

    async fn delete_node_state(&self, pipeline: PipelineId, name: &str) -> DbResult<()> {
        self.lock()?.states.remove(&(pipeline, name.to_string()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
