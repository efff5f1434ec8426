//! Reading the project configuration and its pipeline files

use crate::config::{Config, PipelineFile};
use crate::error::{CoreError, CoreResult};
use crate::pipeline::Pipeline;
use std::collections::HashSet;
use std::path::Path;

use super::Project;

impl Project {
    /// Load a project from a directory containing sqlnode.yml
    pub fn load(root: &Path) -> CoreResult<Self> {
        if !root.is_dir() {
            return Err(CoreError::ConfigNotFound {
                path: root.display().to_string(),
            });
        }
        let config = Config::load_from_dir(root)?;

        let mut pipelines = Vec::with_capacity(config.pipelines.len());
        let mut seen = HashSet::new();
        for relative in &config.pipelines {
            let path = root.join(relative);
            let pipeline = load_pipeline(&path)?;
            if !seen.insert(pipeline.name().clone()) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "pipeline '{}' is defined more than once ({})",
                        pipeline.name(),
                        relative
                    ),
                });
            }
            log::debug!(
                "Loaded pipeline {} with {} nodes from {}",
                pipeline.name(),
                pipeline.nodes().len(),
                path.display()
            );
            pipelines.push(pipeline);
        }

        Ok(Self {
            root: root.to_path_buf(),
            config,
            pipelines,
        })
    }
}

/// Load and validate one pipeline file; `spec_file` paths resolve next to it.
pub(crate) fn load_pipeline(path: &Path) -> CoreResult<Pipeline> {
    let file = PipelineFile::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = file.name.clone();
    let nodes = file.into_nodes(base_dir)?;
    if nodes.is_empty() {
        log::warn!("Pipeline {} declares no nodes", name);
    }
    Pipeline::new(name, nodes)
}
