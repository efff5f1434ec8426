//! Error types for sn-core

use thiserror::Error;

/// Core error type for sqlnode
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Node definition is incomplete or contradictory
    #[error("[E003] Invalid node '{name}': {reason}")]
    InvalidNode { name: String, reason: String },

    /// E004: Two nodes in one pipeline share a name
    #[error("[E004] Duplicate node name in pipeline '{pipeline}': {name}")]
    DuplicateNode { pipeline: String, name: String },

    /// E005: A dependency names a node that is not declared
    #[error("[E005] Node '{node}' depends on undeclared node '{dependency}'")]
    UnknownDependency { node: String, dependency: String },

    /// E006: A dependency is declared after the node that uses it
    #[error("[E006] Node '{node}' depends on '{dependency}', which is declared later in the pipeline")]
    DependencyOrder { node: String, dependency: String },

    /// E007: Circular dependency detected
    #[error("[E007] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E008: Empty identifier where a name is required
    #[error("[E008] Empty name in {context}")]
    EmptyName { context: String },

    /// E009: IO error with file path context
    #[error("[E009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E010: YAML parse error with file path context
    #[error("[E010] Failed to parse '{path}': {source}")]
    YamlWithPath {
        path: String,
        source: serde_yaml::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
