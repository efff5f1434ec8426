use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from([
        "sn",
        "refresh",
        "--pipeline",
        "cough",
        "-p",
        "/srv/flu",
        "--database-url",
        "postgres://localhost/flu",
        "-v",
    ])
    .unwrap();

    assert!(cli.global.verbose);
    assert_eq!(cli.global.project_dir, "/srv/flu");
    assert_eq!(
        cli.global.database_url.as_deref(),
        Some("postgres://localhost/flu")
    );
    match cli.command {
        Commands::Refresh(args) => {
            assert_eq!(args.pipeline.as_deref(), Some("cough"));
            assert_eq!(args.output, OutputFormat::Table);
            assert!(!args.quiet);
        }
        other => panic!("expected refresh, got {:?}", other),
    }
}

#[test]
fn test_ls_json_output() {
    let cli = Cli::try_parse_from(["sn", "ls", "-o", "json"]).unwrap();
    assert_eq!(cli.global.project_dir, ".");
    match cli.command {
        Commands::Ls(args) => {
            assert_eq!(args.output, OutputFormat::Json);
            assert!(args.pipeline.is_none());
        }
        other => panic!("expected ls, got {:?}", other),
    }
}

#[test]
fn test_unknown_output_rejected() {
    assert!(Cli::try_parse_from(["sn", "plan", "--output", "tree"]).is_err());
}

#[test]
fn test_plan_exit_code_flag() {
    let cli = Cli::try_parse_from(["sn", "plan", "--exit-code"]).unwrap();
    match cli.command {
        Commands::Plan(args) => assert!(args.exit_code),
        other => panic!("expected plan, got {:?}", other),
    }
    let cli = Cli::try_parse_from(["sn", "plan"]).unwrap();
    match cli.command {
        Commands::Plan(args) => assert!(!args.exit_code),
        other => panic!("expected plan, got {:?}", other),
    }
}
