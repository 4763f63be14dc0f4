//! Environments - named, ordered lists of units applied together
//!
//! Environments live in `<context>/environments.yaml`:
//!
//! ```yaml
//! - name: laptop
//!   units: [zsh, nvim, fonts]
//! - name: server
//!   units: [zsh]
//! ```
//!
//! Unit names are not validated when the file is read; an unknown name
//! fails when the environment is applied.

use crate::engine::{Engine, NoProgress, RunProgress, Runner};
use crate::error::{Error, Result};
use crate::graph::UnitId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the environments list inside a context directory.
pub const ENVIRONMENTS_FILE: &str = "environments.yaml";

/// A named collection of units to be applied together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub units: Vec<String>,
}

/// Path of the environments file for a context directory
pub fn environments_file(directory: &Path) -> PathBuf {
    directory.join(ENVIRONMENTS_FILE)
}

/// Read and parse `<directory>/environments.yaml`.
pub fn load_environments(directory: &Path) -> Result<Vec<Environment>> {
    let path = environments_file(directory);
    let content = fs::read_to_string(&path).map_err(|source| Error::EnvironmentsRead {
        path: path.clone(),
        source,
    })?;
    let environments: Vec<Environment> =
        serde_yaml::from_str(&content).map_err(|source| Error::EnvironmentsParse {
            path: path.clone(),
            source,
        })?;
    log::debug!(
        "Loaded {} environments from {}",
        environments.len(),
        path.display()
    );
    Ok(environments)
}

/// Find an environment by name. The first match wins.
pub fn find_environment<'e>(
    environments: &'e [Environment],
    name: &str,
) -> Result<&'e Environment> {
    environments
        .iter()
        .find(|env| env.name == name)
        .ok_or_else(|| Error::EnvironmentNotFound {
            name: name.to_string(),
        })
}

impl<R: Runner> Engine<'_, R> {
    /// Apply every unit of the named environment, dependencies included.
    pub fn apply_environment(&mut self, environments: &[Environment], name: &str) -> Result<()> {
        self.apply_environment_with(environments, name, &mut NoProgress)
    }

    /// Like [`Engine::apply_environment`], reporting progress.
    pub fn apply_environment_with<P: RunProgress>(
        &mut self,
        environments: &[Environment],
        name: &str,
        progress: &mut P,
    ) -> Result<()> {
        let environment = find_environment(environments, name)?;
        log::info!(
            "Applying environment {} ({} units)",
            environment.name,
            environment.units.len()
        );

        for unit in &environment.units {
            self.run_unit_with(unit, true, progress)
                .map_err(|e| Error::Environment {
                    environment: environment.name.clone(),
                    unit: unit.clone(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    /// Units applying the named environment would execute, in order.
    ///
    /// Nothing is executed and the ledger is left untouched.
    pub fn plan_environment(
        &self,
        environments: &[Environment],
        name: &str,
    ) -> Result<Vec<UnitId>> {
        let environment = find_environment(environments, name)?;
        let mut planned = self.ledger().clone();
        let mut order = Vec::new();
        for unit in &environment.units {
            let id = self
                .context()
                .require(unit)
                .map_err(|e| Error::Environment {
                    environment: environment.name.clone(),
                    unit: unit.clone(),
                    source: Box::new(e),
                })?;
            self.plan_visit(id, true, &mut planned, &mut order);
        }
        Ok(order)
    }

    /// Load the context's environments file and apply the named environment.
    pub fn apply_named_environment<P: RunProgress>(
        &mut self,
        name: &str,
        progress: &mut P,
    ) -> Result<()> {
        let environments = load_environments(self.context().directory())?;
        self.apply_environment_with(&environments, name, progress)
    }
}
