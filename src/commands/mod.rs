// Unit commands
pub mod apply;
pub mod deps;
pub mod list;

// Context and environment selection
pub mod context;
pub mod env;

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use unitgraph::{RunProgress, ShellIntrospector, Unit, UnitId};

use crate::Context;
use crate::ui;

/// Hydrate the unit graph of the active context directory
pub fn load_units(ctx: &Context) -> Result<unitgraph::Context> {
    let dir = ctx.context_dir()?;
    log::debug!("Using context directory {}", dir.display());
    unitgraph::Context::hydrate(dir.clone(), &ShellIntrospector::default())
        .with_context(|| format!("Failed to load units from {}", dir.display()))
}

/// Print a numbered plan of units that would run
pub fn show_plan(units: &unitgraph::Context, plan: &[UnitId]) {
    if plan.is_empty() {
        ui::info("Nothing to run");
        return;
    }
    for (i, &id) in plan.iter().enumerate() {
        ui::step(i + 1, plan.len(), units.unit(id).name());
    }
    println!();
    ui::info("Dry run - no units executed");
}

/// Renders unit execution on the terminal
pub struct ConsoleProgress {
    verbose: bool,
    quiet: bool,
    completed: usize,
}

impl ConsoleProgress {
    pub fn new(ctx: &Context) -> Self {
        Self {
            verbose: ctx.verbose > 0,
            quiet: ctx.quiet,
            completed: 0,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }
}

impl RunProgress for ConsoleProgress {
    fn on_unit_start(&mut self, unit: &Unit) {
        if !self.quiet {
            ui::unit_banner(unit.name());
        }
    }

    fn on_unit_complete(&mut self, unit: &Unit) {
        self.completed += 1;
        if self.verbose {
            println!("  {} {}", "✓".green(), unit.name().dimmed());
        }
    }

    fn on_unit_skipped(&mut self, unit: &Unit) {
        log::debug!("{} already ran, skipping", unit.name());
    }
}
