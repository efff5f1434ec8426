//! sn-core - Core library for sqlnode
//!
//! This crate provides the managed SQL node kinds, the kind-agnostic drop
//! script, content fingerprints, dependency validation, and project/pipeline
//! configuration used across all sqlnode components.

pub mod config;
pub mod dag;
pub mod drop;
pub mod error;
pub mod hash;
pub mod names;
pub mod node;
pub mod pipeline;
pub mod project;
pub mod source;
pub mod sql_utils;

pub use config::{Config, DatabaseConfig, NodeConfig, PipelineFile, StateConfig};
pub use dag::NodeDag;
pub use drop::drop_table_like;
pub use error::{CoreError, CoreResult};
pub use hash::{build_hashes, NodeHasher};
pub use names::{NodeName, PipelineName};
pub use node::{ManagedNode, NodeKind, NodeSpec};
pub use pipeline::Pipeline;
pub use project::Project;
pub use source::SourceRef;
