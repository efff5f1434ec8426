//! Project discovery and loading

mod loading;

use crate::config::Config;
use crate::names::PipelineName;
use crate::pipeline::Pipeline;
use std::path::PathBuf;

/// Represents a sqlnode project: configuration plus every declared pipeline
#[derive(Debug)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,

    /// Project configuration
    pub config: Config,

    /// Validated pipelines, in the order listed in the configuration
    pub pipelines: Vec<Pipeline>,
}

impl Project {
    /// Get a pipeline by name
    pub fn get_pipeline(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|p| p.name() == name)
    }

    /// Get all pipeline names
    pub fn pipeline_names(&self) -> Vec<&PipelineName> {
        self.pipelines.iter().map(Pipeline::name).collect()
    }

    /// Total number of declared nodes across all pipelines
    pub fn node_count(&self) -> usize {
        self.pipelines.iter().map(|p| p.nodes().len()).sum()
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
