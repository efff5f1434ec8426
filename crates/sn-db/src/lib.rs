//! sn-db - Database abstraction layer for sqlnode
//!
//! This crate provides the `Database` trait pair used by the refresh engine,
//! the persisted node state model, and the PostgreSQL implementation.

pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod postgres;
pub mod state;
pub mod traits;

pub use error::{DbError, DbResult};
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryBackend;
pub use postgres::PostgresBackend;
pub use state::{NodeState, PipelineId, StateTables};
pub use traits::{Database, DatabaseCore, DatabaseState, DbTransaction};
