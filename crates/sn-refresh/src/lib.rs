//! sn-refresh - Refresh orchestration for sqlnode
//!
//! Reconciles a pipeline's declared nodes against the persisted node state:
//! removes nodes that are no longer declared, recreates nodes whose
//! fingerprint changed, and refreshes the rest in place.

pub mod error;
pub mod plan;
pub mod runner;

pub use error::{RefreshError, RefreshResult};
pub use plan::{plan, NodeAction, PlannedNode, RefreshPlan, StaleNode};
pub use runner::{NodeOutcome, Refresher, RefreshSummary};
