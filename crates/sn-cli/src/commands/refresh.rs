//! Refresh command implementation

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use sn_refresh::{NodeAction, RefreshSummary, Refresher};
use std::time::Instant;

use crate::cli::{GlobalArgs, OutputFormat, RefreshArgs};
use crate::commands::common::{connect, load_project, select_pipelines, ExitCode};

/// Execute the refresh command
pub async fn execute(args: &RefreshArgs, global: &GlobalArgs) -> Result<()> {
    let start_time = Instant::now();
    let project = load_project(global)?;
    let pipelines = select_pipelines(&project, args.pipeline.as_deref())?;
    let db = connect(&project, global).await?;

    // Verbose logs go to stderr too; a spinner would garble them
    let show_progress = !args.quiet && !global.verbose && args.output == OutputFormat::Table;

    let mut summaries = Vec::with_capacity(pipelines.len());
    for pipeline in pipelines {
        let spinner = show_progress.then(|| spinner(pipeline.name()));

        let mut refresher = Refresher::new(&db);
        if let Some(pb) = &spinner {
            let pb = pb.clone();
            refresher = refresher.with_progress(move || pb.inc(1));
        }
        let result = refresher.refresh(pipeline).await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match result {
            Ok(summary) => {
                if args.output == OutputFormat::Table {
                    print_summary(&summary);
                }
                summaries.push(summary);
            }
            Err(e) => {
                if args.output == OutputFormat::Json {
                    println!("{}", serde_json::to_string_pretty(&summaries)?);
                }
                eprintln!("✗ Refresh of pipeline '{}' failed: {}", pipeline.name(), e);
                eprintln!("  Nodes finished before the failure remain applied; rerun to continue.");
                return Err(ExitCode(1).into());
            }
        }
    }

    match args.output {
        OutputFormat::Table => println!("Total time: {}ms", start_time.elapsed().as_millis()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
    }
    Ok(())
}

fn spinner(pipeline: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg} ({pos} steps)")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Refreshing {}", pipeline));
    pb
}

fn print_summary(summary: &RefreshSummary) {
    println!("Pipeline {}:", summary.pipeline);
    for name in &summary.removed {
        println!("  ✓ {:<10} {}", "removed", name);
    }
    for node in &summary.nodes {
        if node.action == NodeAction::Unchanged {
            continue;
        }
        println!(
            "  ✓ {:<10} {} ({}) [{}ms]",
            node.action.to_string(),
            node.name,
            node.kind,
            node.elapsed_ms
        );
    }
    println!(
        "  {} created, {} recreated, {} refreshed, {} unchanged, {} removed [{}ms]\n",
        summary.count(NodeAction::Create),
        summary.count(NodeAction::Recreate),
        summary.count(NodeAction::Refresh),
        summary.count(NodeAction::Unchanged),
        summary.removed.len(),
        summary.elapsed_ms
    );
}
