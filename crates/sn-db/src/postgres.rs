//! PostgreSQL backend over a single `tokio-postgres` connection.
//!
//! Node SQL runs through the simple query protocol so a call may carry several
//! statements or a `do $$ ... $$` block. State rows go through the extended
//! protocol with bound parameters.

use crate::error::{describe_pg_error, DbError, DbResult};
use crate::state::{NodeState, PipelineId, StateTables};
use crate::traits::{DatabaseCore, DatabaseState, DbTransaction};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};

/// PostgreSQL database backend
pub struct PostgresBackend {
    client: Mutex<Client>,
    tables: StateTables,
    connection: JoinHandle<()>,
    /// Set when a transaction handle was dropped while still open
    abandoned: AtomicBool,
}

impl PostgresBackend {
    /// Connect and spawn the task that drives the connection.
    ///
    /// Only `NoTls` is supported.
    pub async fn connect(url: &str, tables: StateTables) -> DbResult<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls)
            .await
            .map_err(|e| DbError::ConnectionError(describe_pg_error(&e)))?;

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("PostgreSQL connection error: {}", e);
            }
        });
        log::debug!(
            "Connected to PostgreSQL (state tables {} / {})",
            tables.pipelines,
            tables.nodes
        );

        Ok(Self {
            client: Mutex::new(client),
            tables,
            connection,
            abandoned: AtomicBool::new(false),
        })
    }

    /// Lock the connection, first rolling back a transaction that a dropped
    /// handle left open.
    async fn client(&self) -> DbResult<MutexGuard<'_, Client>> {
        let client = self.client.lock().await;
        if self.abandoned.swap(false, Ordering::SeqCst) {
            log::warn!("Rolling back transaction left open by a dropped handle");
            client.batch_execute("ROLLBACK").await.map_err(|e| {
                DbError::TransactionError(format!("rollback: {}", describe_pg_error(&e)))
            })?;
        }
        Ok(client)
    }
}

fn state_error(what: &'static str) -> impl FnOnce(tokio_postgres::Error) -> DbError {
    move |e| DbError::StateError(format!("{}: {}", what, describe_pg_error(&e)))
}

impl Drop for PostgresBackend {
    fn drop(&mut self) {
        self.connection.abort();
    }
}

/// Transaction holding the connection lock until it finishes.
struct PgTransaction<'a> {
    client: MutexGuard<'a, Client>,
    abandoned: &'a AtomicBool,
    finished: bool,
}

#[async_trait]
impl DbTransaction for PgTransaction<'_> {
    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| DbError::execution(describe_pg_error(&e), sql))
    }

    async fn commit(mut self: Box<Self>) -> DbResult<()> {
        self.finished = true;
        self.client
            .batch_execute("COMMIT")
            .await
            .map_err(|e| DbError::TransactionError(format!("commit: {}", describe_pg_error(&e))))
    }

    async fn rollback(mut self: Box<Self>) -> DbResult<()> {
        self.finished = true;
        self.client
            .batch_execute("ROLLBACK")
            .await
            .map_err(|e| DbError::TransactionError(format!("rollback: {}", describe_pg_error(&e))))
    }
}

impl Drop for PgTransaction<'_> {
    fn drop(&mut self) {
        // Flagged while the lock is still held, so the next user rolls back
        if !self.finished {
            log::warn!("Transaction dropped without commit or rollback");
            self.abandoned.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl DatabaseCore for PostgresBackend {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        let client = self.client().await?;
        client
            .batch_execute(sql)
            .await
            .map_err(|e| DbError::execution(describe_pg_error(&e), sql))
    }

    async fn begin<'a>(&'a self) -> DbResult<Box<dyn DbTransaction + 'a>> {
        let client = self.client().await?;
        client
            .batch_execute("BEGIN")
            .await
            .map_err(|e| DbError::TransactionError(format!("begin: {}", describe_pg_error(&e))))?;
        Ok(Box::new(PgTransaction {
            client,
            abandoned: &self.abandoned,
            finished: false,
        }))
    }
}

#[async_trait]
impl DatabaseState for PostgresBackend {
    async fn find_pipeline(&self, name: &str) -> DbResult<Option<PipelineId>> {
        let sql = self.tables.find_pipeline_sql();
        let client = self.client().await?;
        let row = client
            .query_opt(&sql, &[&name])
            .await
            .map_err(state_error("find pipeline"))?;
        match row {
            Some(row) => {
                let id: i64 = row.try_get(0).map_err(state_error("read pipeline id"))?;
                Ok(Some(PipelineId(id)))
            }
            None => Ok(None),
        }
    }

    async fn load_node_states(&self, pipeline: PipelineId) -> DbResult<Vec<NodeState>> {
        let sql = self.tables.load_nodes_sql();
        let client = self.client().await?;
        let rows = client
            .query(&sql, &[&pipeline.0])
            .await
            .map_err(state_error("load node states"))?;

        rows.iter()
            .map(|row| {
                Ok(NodeState {
                    pipeline,
                    name: row.try_get(0).map_err(state_error("read node name"))?,
                    hash: row.try_get(1).map_err(state_error("read node hash"))?,
                    cleanup: row.try_get(2).map_err(state_error("read node cleanup"))?,
                })
            })
            .collect()
    }

    async fn upsert_node_state(&self, state: &NodeState) -> DbResult<()> {
        let sql = self.tables.upsert_node_sql();
        let client = self.client().await?;
        client
            .execute(
                &sql,
                &[&state.pipeline.0, &state.name, &state.hash, &state.cleanup],
            )
            .await
            .map_err(state_error("upsert node state"))?;
        Ok(())
    }

    async fn delete_node_state(&self, pipeline: PipelineId, name: &str) -> DbResult<()> {
        let sql = self.tables.delete_node_sql();
        let client = self.client().await?;
        client
            .execute(&sql, &[&pipeline.0, &name])
            .await
            .map_err(state_error("delete node state"))?;
        Ok(())
    }
}
