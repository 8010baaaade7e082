mod cli;
mod commands;
mod corrections;
mod extraction;
mod language;
mod model;
mod tables;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, StoryCommand};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::MergeLines(args) => commands::merge_lines::run(args),
        Commands::Extract(args) => commands::extract::run(args),
        Commands::ToJson(args) => commands::convert::run_to_json(args),
        Commands::ToCsv(args) => commands::convert::run_to_csv(args),
        Commands::Patch(args) => commands::patch::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Story(StoryCommand::Export(args)) => commands::story::run_export(args),
        Commands::Story(StoryCommand::Apply(args)) => commands::story::run_apply(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
