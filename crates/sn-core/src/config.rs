//! Configuration types and parsing for sqlnode.yml and pipeline files

use crate::error::{CoreError, CoreResult};
use crate::names::{NodeName, PipelineName};
use crate::node::{ManagedNode, NodeKind, NodeSpec};
use crate::source::SourceRef;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main project configuration from sqlnode.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Location of the persisted state tables
    #[serde(default)]
    pub state: StateConfig,

    /// Pipeline definition files, relative to the project root, refreshed in this order
    pub pipelines: Vec<String>,
}

/// Database connection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string; the CLI's `--database-url` takes precedence
    #[serde(default)]
    pub url: Option<String>,
}

/// Names of the externally provisioned state tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    /// Schema holding both state tables
    #[serde(default = "default_state_schema")]
    pub schema: String,

    /// Table of registered pipelines: `(id, name)`
    #[serde(default = "default_pipeline_table")]
    pub pipeline_table: String,

    /// Table of applied nodes: `(pipeline, name, hash, cleanup)`
    #[serde(default = "default_node_table")]
    pub node_table: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            schema: default_state_schema(),
            pipeline_table: default_pipeline_table(),
            node_table: default_node_table(),
        }
    }
}

fn default_state_schema() -> String {
    crate::sql_utils::DEFAULT_SCHEMA.to_string()
}

fn default_pipeline_table() -> String {
    "data_pipelines".to_string()
}

fn default_node_table() -> String {
    "data_nodes".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::YamlWithPath {
                path: path.display().to_string(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for sqlnode.yml or sqlnode.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("sqlnode.yml");
        let yaml_path = dir.join("sqlnode.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }
        if self.pipelines.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one pipelines entry must be specified".to_string(),
            });
        }
        for (label, value) in [
            ("state.schema", &self.state.schema),
            ("state.pipeline_table", &self.state.pipeline_table),
            ("state.node_table", &self.state.node_table),
        ] {
            if value.is_empty() {
                return Err(CoreError::EmptyName {
                    context: label.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// A pipeline definition file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineFile {
    /// Registered pipeline name
    pub name: PipelineName,

    /// Nodes in dependency order
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

/// One node entry in a pipeline file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub name: NodeName,

    pub kind: NodeKind,

    #[serde(default)]
    pub deps: Vec<NodeName>,

    /// Inline SQL fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,

    /// SQL fragment file, relative to the pipeline file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_file: Option<String>,

    /// Upstream table for `source_table` nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,

    /// Refresh step one for `table` nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_stale_rows: Option<String>,

    /// Refresh step two for `table` nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_new_rows: Option<String>,
}

impl PipelineFile {
    /// Load a pipeline file from disk
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| CoreError::YamlWithPath {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Resolve every node into its managed form.
    ///
    /// `base_dir` anchors relative `spec_file` paths.
    pub fn into_nodes(self, base_dir: &Path) -> CoreResult<Vec<ManagedNode>> {
        self.nodes
            .into_iter()
            .map(|node| node.into_managed(base_dir))
            .collect()
    }
}

impl NodeConfig {
    /// Convert to a [`ManagedNode`], checking that the fields match the kind.
    pub fn into_managed(self, base_dir: &Path) -> CoreResult<ManagedNode> {
        let invalid = |reason: &str| CoreError::InvalidNode {
            name: self.name.to_string(),
            reason: reason.to_string(),
        };

        let spec_text = match (&self.spec, &self.spec_file) {
            (Some(spec), None) => spec.trim_end().to_string(),
            (None, Some(file)) => {
                let path = base_dir.join(file);
                std::fs::read_to_string(&path)
                    .map_err(|e| CoreError::IoWithPath {
                        path: path.display().to_string(),
                        source: e,
                    })?
                    .trim_end()
                    .to_string()
            }
            (Some(_), Some(_)) => return Err(invalid("set either spec or spec_file, not both")),
            (None, None) => return Err(invalid("one of spec or spec_file is required")),
        };
        if spec_text.trim().is_empty() {
            return Err(invalid("spec is empty"));
        }

        let is_table = self.kind == NodeKind::Table;
        if !is_table && (self.delete_stale_rows.is_some() || self.insert_new_rows.is_some()) {
            return Err(invalid(
                "delete_stale_rows/insert_new_rows are only valid for kind table",
            ));
        }
        if self.kind != NodeKind::SourceTable && self.source.is_some() {
            return Err(invalid("source is only valid for kind source_table"));
        }

        let spec = NodeSpec {
            name: self.name,
            deps: self.deps,
            spec: spec_text,
        };

        let node = match self.kind {
            NodeKind::Type => ManagedNode::Type(spec),
            NodeKind::View => ManagedNode::View(spec),
            NodeKind::MaterializedView => ManagedNode::MaterializedView(spec),
            NodeKind::Table => match (self.delete_stale_rows, self.insert_new_rows) {
                (Some(delete_stale_rows), Some(insert_new_rows)) => ManagedNode::Table {
                    spec,
                    delete_stale_rows,
                    insert_new_rows,
                },
                _ => {
                    return Err(CoreError::InvalidNode {
                        name: spec.name.to_string(),
                        reason: "kind table requires delete_stale_rows and insert_new_rows"
                            .to_string(),
                    })
                }
            },
            NodeKind::SourceTable => match self.source {
                Some(source) => ManagedNode::SourceTable { spec, source },
                None => {
                    return Err(CoreError::InvalidNode {
                        name: spec.name.to_string(),
                        reason: "kind source_table requires source".to_string(),
                    })
                }
            },
        };
        Ok(node)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
