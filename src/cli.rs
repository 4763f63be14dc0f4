use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "yadu")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Yet Another Dotfiles Utility", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Context directory to use instead of the configured one
    #[arg(long, global = true, env = "YADU_CONTEXT", value_name = "DIR")]
    pub context: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List all available units
    List,

    /// Apply a specific unit
    Apply(ApplyArgs),

    /// Show the dependency tree of a unit
    Deps {
        /// Unit name
        unit: String,
    },

    /// Get or set the context directory
    Context {
        /// New context directory
        directory: Option<String>,
    },

    /// Manage environments (named groups of units)
    #[command(subcommand)]
    Env(EnvCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Unit name
    pub unit: String,

    /// Run only this unit, not its dependencies
    #[arg(long)]
    pub no_deps: bool,

    /// Dry run - show what would be run
    #[arg(short, long)]
    pub dry_run: bool,
}

// ============================================================================
// Env Commands
// ============================================================================

#[derive(Subcommand)]
pub enum EnvCommand {
    /// List environments defined in environments.yaml
    List,

    /// Show the active environment
    Current,

    /// Select the active environment
    Use {
        /// Environment name
        name: String,
    },

    /// Apply an environment (defaults to the active one)
    Apply {
        /// Environment name
        name: Option<String>,

        /// Dry run - show what would be run
        #[arg(short, long)]
        dry_run: bool,
    },
}
