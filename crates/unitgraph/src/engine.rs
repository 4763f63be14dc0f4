//! Execution engine - runs units in dependency order, each at most once
//!
//! An [`Engine`] walks the graph depth-first: a unit's dependencies run in
//! their declared order before the unit itself. Units that completed are
//! recorded in the engine's [`Ledger`] and never run again by that engine.
//! The first failure stops the walk.

use crate::error::{Error, Result};
use crate::graph::{Context, Unit, UnitId};
use std::collections::HashSet;
use std::path::Path;
use std::process::{Command, Stdio};

/// Executes a single unit's script.
pub trait Runner {
    /// Run `unit` with `workdir` as working directory
    fn run(&self, unit: &Unit, workdir: &Path) -> Result<()>;
}

/// Runs unit scripts with a shell, connected to the caller's terminal.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("bash")
    }
}

impl ShellRunner {
    /// Create a runner that executes unit files with the given shell
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Runner for ShellRunner {
    fn run(&self, unit: &Unit, workdir: &Path) -> Result<()> {
        let status = Command::new(&self.shell)
            .arg(unit.file())
            .current_dir(workdir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Error::Execution {
                unit: unit.name().to_string(),
                reason: format!("failed to start {}: {e}", self.shell),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Execution {
                unit: unit.name().to_string(),
                reason: status.to_string(),
            })
        }
    }
}

/// Progress callbacks for unit execution
pub trait RunProgress {
    /// Called right before a unit's script starts
    fn on_unit_start(&mut self, unit: &Unit);

    /// Called after a unit's script succeeded
    fn on_unit_complete(&mut self, unit: &Unit);

    /// Called when a requested unit already ran in this session
    fn on_unit_skipped(&mut self, _unit: &Unit) {}
}

/// No-op progress callback
pub struct NoProgress;

impl RunProgress for NoProgress {
    fn on_unit_start(&mut self, _unit: &Unit) {}
    fn on_unit_complete(&mut self, _unit: &Unit) {}
}

/// Set of units that completed successfully in one session.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    done: HashSet<UnitId>,
}

impl Ledger {
    /// Whether the unit already ran
    pub fn has_run(&self, id: UnitId) -> bool {
        self.done.contains(&id)
    }

    fn record(&mut self, id: UnitId) {
        self.done.insert(id);
    }

    /// Number of units that ran
    pub fn len(&self) -> usize {
        self.done.len()
    }

    /// Whether nothing ran yet
    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }
}

/// Runs units of a hydrated [`Context`].
pub struct Engine<'a, R: Runner> {
    context: &'a Context,
    runner: R,
    ledger: Ledger,
}

impl<'a, R: Runner> Engine<'a, R> {
    /// Start a session with an empty ledger
    pub fn new(context: &'a Context, runner: R) -> Self {
        Self {
            context,
            runner,
            ledger: Ledger::default(),
        }
    }

    /// The graph this engine runs
    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// Units completed in this session
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The runner executing unit scripts
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run a unit, optionally preceded by its transitive dependencies.
    pub fn run_unit(&mut self, name: &str, include_dependencies: bool) -> Result<()> {
        self.run_unit_with(name, include_dependencies, &mut NoProgress)
    }

    /// Like [`Engine::run_unit`], reporting progress.
    pub fn run_unit_with<P: RunProgress>(
        &mut self,
        name: &str,
        include_dependencies: bool,
        progress: &mut P,
    ) -> Result<()> {
        let id = self.context.require(name)?;
        if self.ledger.has_run(id) {
            progress.on_unit_skipped(self.context.unit(id));
            return Ok(());
        }
        self.visit(id, include_dependencies, progress)
    }

    fn visit<P: RunProgress>(
        &mut self,
        id: UnitId,
        include_dependencies: bool,
        progress: &mut P,
    ) -> Result<()> {
        if self.ledger.has_run(id) {
            return Ok(());
        }

        let unit = self.context.unit(id);
        if include_dependencies {
            for &dep in unit.dependencies() {
                self.visit(dep, true, progress)?;
            }
        }

        log::info!("Running unit {}", unit.name());
        progress.on_unit_start(unit);
        self.runner.run(unit, self.context.directory())?;
        self.ledger.record(id);
        progress.on_unit_complete(unit);
        Ok(())
    }

    /// Units a run would execute, in order, given what already ran.
    ///
    /// Nothing is executed and the ledger is left untouched.
    pub fn plan(&self, name: &str, include_dependencies: bool) -> Result<Vec<UnitId>> {
        let id = self.context.require(name)?;
        let mut planned = self.ledger.clone();
        let mut order = Vec::new();
        self.plan_visit(id, include_dependencies, &mut planned, &mut order);
        Ok(order)
    }

    pub(crate) fn plan_visit(
        &self,
        id: UnitId,
        include_dependencies: bool,
        planned: &mut Ledger,
        order: &mut Vec<UnitId>,
    ) {
        if planned.has_run(id) {
            return;
        }
        if include_dependencies {
            for &dep in self.context.unit(id).dependencies() {
                self.plan_visit(dep, true, planned, order);
            }
        }
        planned.record(id);
        order.push(id);
    }
}
