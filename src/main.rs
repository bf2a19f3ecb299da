mod cli;
mod commands;
mod config;
mod display;
mod json;
mod progress;
mod provider;
mod resource;
mod session;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    let paths = cli.paths();

    match cli.command {
        Command::Validate => commands::validate::run(&ctx, &paths),
        Command::Plan(args) => commands::plan::run(&ctx, &paths, args.target.as_deref()),
        Command::Apply(args) => commands::apply::run(&ctx, &paths, args),
        Command::Destroy(args) => commands::destroy::run(&ctx, &paths, args),
        Command::Refresh(args) => commands::refresh::run(&ctx, &paths, args.jobs),
        Command::Show(args) => commands::show::run(&ctx, &paths, args),
        Command::Import { address, id } => commands::import::run(&ctx, &paths, &address, &id),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "whiskform", &mut io::stdout());
            Ok(())
        }
    }
}
