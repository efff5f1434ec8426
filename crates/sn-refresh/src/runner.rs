//! Refresh execution

use crate::error::{RefreshError, RefreshResult};
use crate::plan::{plan, NodeAction, RefreshPlan};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sn_core::{ManagedNode, NodeKind, NodeName, Pipeline};
use sn_db::{Database, NodeState, PipelineId};
use std::time::Instant;

/// Outcome of one declared node in a finished run
#[derive(Debug, Clone, Serialize)]
pub struct NodeOutcome {
    pub name: NodeName,
    pub kind: NodeKind,
    pub action: NodeAction,
    /// Wall time spent on the node, in milliseconds
    pub elapsed_ms: u64,
}

/// Summary of a completed refresh run
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub pipeline: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,

    /// Persisted nodes removed because they are no longer declared
    pub removed: Vec<String>,

    /// Declared nodes, in processing order
    pub nodes: Vec<NodeOutcome>,
}

impl RefreshSummary {
    /// Number of nodes that ended with `action`
    pub fn count(&self, action: NodeAction) -> usize {
        self.nodes.iter().filter(|n| n.action == action).count()
    }
}

type Progress = Box<dyn Fn() + Send + Sync>;

/// Runs the reconciliation for a pipeline against one database handle.
///
/// Nodes are processed strictly one at a time in declared order. Each node's
/// create statements, and each node's refresh statements, run in their own
/// transaction; nothing spans the whole run. Callers must not run two
/// refreshes of the same pipeline concurrently.
pub struct Refresher<'a> {
    db: &'a dyn Database,
    progress: Option<Progress>,
}

impl<'a> Refresher<'a> {
    /// Create a new refresher
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db, progress: None }
    }

    /// Install a callback fired at coarse checkpoints, for keep-alive signalling.
    pub fn with_progress(mut self, progress: impl Fn() + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    fn tick(&self) {
        if let Some(progress) = &self.progress {
            progress();
        }
    }

    async fn registration(&self, pipeline: &Pipeline) -> RefreshResult<PipelineId> {
        self.db
            .find_pipeline(pipeline.name())
            .await?
            .ok_or_else(|| RefreshError::PipelineNotRegistered(pipeline.name().to_string()))
    }

    /// Compute what [`refresh`](Self::refresh) would do, without changing anything.
    pub async fn plan(&self, pipeline: &Pipeline) -> RefreshResult<RefreshPlan> {
        let id = self.registration(pipeline).await?;
        let states = self.db.load_node_states(id).await?;
        let hashes = pipeline.hashes()?;
        plan(pipeline, &hashes, &states)
    }

    /// Bring the database in line with `pipeline`.
    ///
    /// An error stops the run; nodes already processed stay applied and a
    /// second call converges from there.
    pub async fn refresh(&self, pipeline: &Pipeline) -> RefreshResult<RefreshSummary> {
        let started_at = Utc::now();
        let run_start = Instant::now();

        let id = self.registration(pipeline).await?;
        let states = self.db.load_node_states(id).await?;
        log::info!(
            "Refreshing {} nodes from {} existing",
            pipeline.nodes().len(),
            states.len()
        );

        let hashes = pipeline.hashes()?;
        self.tick();

        let plan = plan(pipeline, &hashes, &states)?;

        let mut removed = Vec::with_capacity(plan.stale.len());
        for stale in &plan.stale {
            log::info!("Destroying node {}", stale.name);
            self.run(&stale.name, &stale.cleanup).await?;
            self.tick();
            self.db.delete_node_state(id, &stale.name).await?;
            self.tick();
            removed.push(stale.name.clone());
        }

        let mut nodes = Vec::with_capacity(plan.nodes.len());
        for (node, planned) in pipeline.nodes().iter().zip(&plan.nodes) {
            let start = Instant::now();
            match planned.action {
                NodeAction::Unchanged => {}
                NodeAction::Refresh => {
                    let statements = node.refresh().unwrap_or_default();
                    self.db
                        .execute_in_transaction(&statements, &|| {})
                        .await
                        .map_err(RefreshError::node(node.name()))?;
                    log::info!("Refreshed {} in {} ms", node.name(), elapsed_ms(start));
                    self.tick();
                }
                NodeAction::Create | NodeAction::Recreate => {
                    self.rebuild(id, node, &planned.hash).await?;
                    log::info!("Recreated {} in {} ms", node.name(), elapsed_ms(start));
                    self.tick();
                }
            }
            nodes.push(NodeOutcome {
                name: planned.name.clone(),
                kind: planned.kind,
                action: planned.action,
                elapsed_ms: elapsed_ms(start),
            });
        }

        Ok(RefreshSummary {
            pipeline: pipeline.name().to_string(),
            started_at,
            elapsed_ms: elapsed_ms(run_start),
            removed,
            nodes,
        })
    }

    /// Drop whatever exists under the node's name, create it in one
    /// transaction, then record the new fingerprint.
    ///
    /// The drop runs outside the transaction: a failure between the two steps
    /// leaves the object absent until the next run.
    async fn rebuild(&self, id: PipelineId, node: &ManagedNode, hash: &str) -> RefreshResult<()> {
        let cleanup = node.delete();
        self.run(node.name(), &cleanup).await?;
        self.tick();

        self.db
            .execute_in_transaction(&node.create(), &|| self.tick())
            .await
            .map_err(RefreshError::node(node.name()))?;

        self.db
            .upsert_node_state(&NodeState {
                pipeline: id,
                name: node.name().to_string(),
                hash: hash.to_string(),
                cleanup,
            })
            .await?;
        Ok(())
    }

    async fn run(&self, node: &str, sql: &str) -> RefreshResult<()> {
        log::debug!("Running SQL: {}", sql);
        self.db
            .execute(sql)
            .await
            .map_err(RefreshError::node(node))
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
