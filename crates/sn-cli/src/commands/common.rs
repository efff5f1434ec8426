//! Shared utilities for CLI commands

use anyhow::{anyhow, Context, Result};
use sn_core::{Pipeline, Project};
use sn_db::{PostgresBackend, StateTables};
use std::fmt;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // main exits with the code without printing this
        write!(f, "exit code {}", self.0)
    }
}

impl std::error::Error for ExitCode {}

/// Load the project from `--project-dir`.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    Project::load(Path::new(&global.project_dir)).context("Failed to load project")
}

/// The pipeline named by `--pipeline`, or every pipeline in configuration order.
pub(crate) fn select_pipelines<'a>(
    project: &'a Project,
    name: Option<&str>,
) -> Result<Vec<&'a Pipeline>> {
    match name {
        Some(name) => {
            let pipeline = project.get_pipeline(name).ok_or_else(|| {
                anyhow!(
                    "Pipeline '{}' not found. Available: {}",
                    name,
                    project
                        .pipeline_names()
                        .iter()
                        .map(|n| n.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })?;
            Ok(vec![pipeline])
        }
        None => Ok(project.pipelines.iter().collect()),
    }
}

/// Resolve the connection string: `--database-url` / `SQLNODE_DATABASE_URL`
/// first, then `database.url` from sqlnode.yml.
pub(crate) fn database_url(project: &Project, global: &GlobalArgs) -> Result<String> {
    global
        .database_url
        .clone()
        .or_else(|| project.config.database.url.clone())
        .context(
            "No database URL: pass --database-url, set SQLNODE_DATABASE_URL, or set database.url in sqlnode.yml",
        )
}

/// Connect to the project's database with its configured state tables.
pub(crate) async fn connect(project: &Project, global: &GlobalArgs) -> Result<PostgresBackend> {
    let url = database_url(project, global)?;
    let tables = StateTables::from(&project.config.state);
    PostgresBackend::connect(&url, tables)
        .await
        .context("Failed to connect to database")
}

/// Leading characters of a fingerprint, for display
pub(crate) fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
