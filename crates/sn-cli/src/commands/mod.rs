//! CLI command implementations

pub(crate) mod common;
pub mod ls;
pub mod plan;
pub mod refresh;
pub mod validate;
