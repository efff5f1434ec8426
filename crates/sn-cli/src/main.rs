//! sqlnode CLI - keeps managed SQL nodes in step with their declarations

use clap::Parser;

mod cli;
mod commands;
mod logger;

use cli::Cli;
use commands::common::ExitCode;
use commands::{ls, plan, refresh, validate};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    logger::init(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Validate(args) => validate::execute(args, &cli.global).await,
        cli::Commands::Ls(args) => ls::execute(args, &cli.global).await,
        cli::Commands::Plan(args) => plan::execute(args, &cli.global).await,
        cli::Commands::Refresh(args) => refresh::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::ExitCode::from(*code as u8),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::ExitCode::FAILURE
            }
        },
    }
}
