//! Validate command implementation

use anyhow::Result;
use sn_core::{Pipeline, Project};
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{select_pipelines, ExitCode};

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    print!("Loading project at {} ... ", global.project_dir);
    let project = match Project::load(Path::new(&global.project_dir)) {
        Ok(project) => {
            println!("✓");
            project
        }
        Err(e) => {
            println!("✗");
            eprintln!("  {}", e);
            return Err(ExitCode(1).into());
        }
    };
    println!("Validating project: {}\n", project.config.name);

    let pipelines = select_pipelines(&project, args.pipeline.as_deref())?;
    let mut failures = 0;
    for pipeline in &pipelines {
        print!("  {} ... ", pipeline.name());
        match check_pipeline(pipeline) {
            Ok(()) => println!("✓ ({})", describe_kinds(pipeline)),
            Err(e) => {
                failures += 1;
                println!("✗");
                eprintln!("    {}", e);
            }
        }
    }

    let node_count: usize = pipelines.iter().map(|p| p.nodes().len()).sum();
    println!();
    if failures > 0 {
        println!("{} of {} pipelines failed validation", failures, pipelines.len());
        return Err(ExitCode(1).into());
    }
    println!(
        "{} pipelines, {} nodes validated successfully",
        pipelines.len(),
        node_count
    );
    Ok(())
}

/// Dependency order and fingerprints must both resolve.
fn check_pipeline(pipeline: &Pipeline) -> sn_core::CoreResult<()> {
    pipeline.dag()?.topological_order()?;
    pipeline.hashes()?;
    Ok(())
}

/// e.g. `3 nodes: 1 type, 2 view`
fn describe_kinds(pipeline: &Pipeline) -> String {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for node in pipeline.nodes() {
        *counts.entry(node.kind().to_string()).or_default() += 1;
    }
    if counts.is_empty() {
        return "no nodes".to_string();
    }
    let parts: Vec<String> = counts
        .iter()
        .map(|(kind, n)| format!("{} {}", n, kind))
        .collect();
    format!("{} nodes: {}", pipeline.nodes().len(), parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sn_core::{ManagedNode, NodeSpec, PipelineName};

    #[test]
    fn test_describe_kinds() {
        let pipeline = Pipeline::new(
            PipelineName::new("cough"),
            vec![
                ManagedNode::Type(NodeSpec::new("d.t", &[], "(v text)")),
                ManagedNode::View(NodeSpec::new("d.a", &[], "select 1")),
                ManagedNode::View(NodeSpec::new("d.b", &[], "select 2")),
            ],
        )
        .unwrap();
        assert_eq!(describe_kinds(&pipeline), "3 nodes: 1 type, 2 view");
        assert!(check_pipeline(&pipeline).is_ok());
    }

    #[test]
    fn test_describe_empty_pipeline() {
        let pipeline = Pipeline::new(PipelineName::new("cough"), vec![]).unwrap();
        assert_eq!(describe_kinds(&pipeline), "no nodes");
    }
}
