//! List command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sn_core::{NodeKind, NodeName, Pipeline};

use crate::cli::{GlobalArgs, LsArgs, OutputFormat};
use crate::commands::common::{load_project, select_pipelines, short_hash};

/// Execute the ls command
pub async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let pipelines = select_pipelines(&project, args.pipeline.as_deref())?;

    let mut rows = Vec::new();
    for pipeline in pipelines {
        rows.extend(
            node_rows(pipeline)
                .with_context(|| format!("Failed to fingerprint pipeline '{}'", pipeline.name()))?,
        );
    }

    match args.output {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}

/// Node information for display
#[derive(Debug, Serialize)]
struct NodeRow {
    pipeline: String,
    name: String,
    kind: NodeKind,
    deps: Vec<String>,
    /// Nodes that depend on this one directly
    dependents: Vec<String>,
    /// Every node rebuilt when this one changes
    downstream: Vec<String>,
    hash: String,
}

fn sorted(names: Vec<NodeName>) -> Vec<String> {
    let mut names: Vec<String> = names.into_iter().map(NodeName::into_inner).collect();
    names.sort();
    names
}

fn node_rows(pipeline: &Pipeline) -> sn_core::CoreResult<Vec<NodeRow>> {
    let hashes = pipeline.hashes()?;
    let dag = pipeline.dag()?;
    Ok(pipeline
        .nodes()
        .iter()
        .map(|node| NodeRow {
            pipeline: pipeline.name().to_string(),
            name: node.name().to_string(),
            kind: node.kind(),
            deps: sorted(dag.dependencies(node.name())),
            dependents: sorted(dag.dependents(node.name())),
            downstream: sorted(dag.descendants(node.name())),
            hash: hashes.get(node.name()).cloned().unwrap_or_default(),
        })
        .collect())
}

/// Print nodes in table format
fn print_table(rows: &[NodeRow]) {
    let pipeline_width = rows.iter().map(|r| r.pipeline.len()).max().unwrap_or(8).max(8);
    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4);
    let kind_width = 17;
    let hash_width = 12;
    let downstream_width = 10;

    println!(
        "{:<pipeline_width$}  {:<name_width$}  {:<kind_width$}  {:<hash_width$}  {:<downstream_width$}  DEPENDS_ON",
        "PIPELINE",
        "NAME",
        "KIND",
        "HASH",
        "DOWNSTREAM",
        pipeline_width = pipeline_width,
        name_width = name_width,
        kind_width = kind_width,
        hash_width = hash_width,
        downstream_width = downstream_width
    );
    println!(
        "{:-<pipeline_width$}  {:-<name_width$}  {:-<kind_width$}  {:-<hash_width$}  {:-<downstream_width$}  {}",
        "",
        "",
        "",
        "",
        "",
        "-".repeat(40),
        pipeline_width = pipeline_width,
        name_width = name_width,
        kind_width = kind_width,
        hash_width = hash_width,
        downstream_width = downstream_width
    );

    for row in rows {
        let deps_str = if row.deps.is_empty() {
            "-".to_string()
        } else {
            row.deps.join(", ")
        };
        println!(
            "{:<pipeline_width$}  {:<name_width$}  {:<kind_width$}  {:<hash_width$}  {:<downstream_width$}  {}",
            row.pipeline,
            row.name,
            row.kind.to_string(),
            short_hash(&row.hash),
            row.downstream.len(),
            deps_str,
            pipeline_width = pipeline_width,
            name_width = name_width,
            kind_width = kind_width,
            hash_width = hash_width,
            downstream_width = downstream_width
        );
    }

    println!();
    println!("{} nodes found", rows.len());
}
