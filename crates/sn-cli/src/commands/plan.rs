//! Plan command implementation

use anyhow::{Context, Result};
use sn_refresh::{NodeAction, RefreshPlan, Refresher};

use crate::cli::{GlobalArgs, OutputFormat, PlanArgs};
use crate::commands::common::{connect, load_project, select_pipelines, short_hash, ExitCode};

/// Execute the plan command
pub async fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let pipelines = select_pipelines(&project, args.pipeline.as_deref())?;
    let db = connect(&project, global).await?;
    let refresher = Refresher::new(&db);

    let mut plans = Vec::with_capacity(pipelines.len());
    for pipeline in pipelines {
        let plan = refresher
            .plan(pipeline)
            .await
            .with_context(|| format!("Failed to plan pipeline '{}'", pipeline.name()))?;
        plans.push(plan);
    }

    match args.output {
        OutputFormat::Table => {
            for plan in &plans {
                print_plan(plan);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plans)?),
    }

    if args.exit_code && plans.iter().any(RefreshPlan::has_changes) {
        return Err(ExitCode(2).into());
    }
    Ok(())
}

fn print_plan(plan: &RefreshPlan) {
    println!("Pipeline {}:", plan.pipeline);
    if !plan.has_changes() {
        println!("  Nothing to create, recreate or remove");
    }
    for stale in &plan.stale {
        println!("  - {:<10} {}", "remove", stale.name);
    }
    for node in &plan.nodes {
        let marker = match node.action {
            NodeAction::Create => "+",
            NodeAction::Recreate => "~",
            NodeAction::Refresh => "↻",
            NodeAction::Unchanged => " ",
        };
        println!(
            "  {} {:<10} {} ({}, {})",
            marker,
            node.action.to_string(),
            node.name,
            node.kind,
            short_hash(&node.hash)
        );
    }
    println!(
        "  {} to create, {} to recreate, {} to refresh, {} to remove\n",
        plan.count(NodeAction::Create),
        plan.count(NodeAction::Recreate),
        plan.count(NodeAction::Refresh),
        plan.stale.len()
    );
}
