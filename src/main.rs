mod cli;
mod commands;
mod config;
mod paths;
mod ui;

use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Context directory given on the command line or via `YADU_CONTEXT`
    pub context_override: Option<String>,
}

impl Context {
    /// Context directory for this invocation
    pub fn context_dir(&self) -> Result<PathBuf> {
        match &self.context_override {
            Some(dir) => {
                let expanded = paths::expand(dir);
                std::path::absolute(&expanded)
                    .with_context(|| format!("Invalid context directory {}", expanded.display()))
            }
            None => config::YaduConfig::load()?.context_dir(),
        }
    }
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
        context_override: cli.context,
    };

    match cli.command {
        Command::List => commands::list::run(&ctx),
        Command::Apply(args) => commands::apply::run(&ctx, &args),
        Command::Deps { unit } => commands::deps::run(&ctx, &unit),
        Command::Context { directory } => commands::context::run(&ctx, directory.as_deref()),
        Command::Env(cmd) => commands::env::run(&ctx, cmd),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "yadu", &mut io::stdout());
            Ok(())
        }
    }
}
