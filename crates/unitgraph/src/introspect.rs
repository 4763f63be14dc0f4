//! Unit introspection
//!
//! A unit file is a shell script that, when sourced, defines two functions:
//! `description` (one line of text) and `dependencies` (whitespace-separated
//! unit names). The graph only talks to the [`Introspect`] trait; the shell
//! convention lives in [`ShellIntrospector`].

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Environment variable set while a unit is being queried.
///
/// Scripts can check it to skip their top-level body when sourced.
pub const QUERY_ENV: &str = "YADU_QUERY";

const DESCRIPTION: &str = "description";
const DEPENDENCIES: &str = "dependencies";

/// Source of a unit's metadata.
pub trait Introspect {
    /// Human-readable description of the unit
    fn description(&self, name: &str, file: &Path) -> Result<String>;

    /// Names of the units this unit depends on, in declared order
    fn dependencies(&self, name: &str, file: &Path) -> Result<Vec<String>>;
}

/// Queries units by sourcing them in a shell subprocess.
#[derive(Debug, Clone)]
pub struct ShellIntrospector {
    shell: String,
}

impl Default for ShellIntrospector {
    fn default() -> Self {
        Self::new("bash")
    }
}

impl ShellIntrospector {
    /// Create an introspector that sources units with the given shell
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Source `file` and call the named function, returning its stdout.
    fn query(&self, name: &str, file: &Path, query: &'static str) -> Result<String> {
        log::debug!("Querying {query} of {name} ({})", file.display());

        let script = format!("source \"$1\" && {query}");
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&script)
            .arg("yadu-introspect")
            .arg(file)
            .env(QUERY_ENV, query)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Introspection {
                unit: name.to_string(),
                query,
                reason: format!("failed to start {}: {e}", self.shell),
                stderr: String::new(),
            })?;

        if !output.status.success() {
            return Err(Error::Introspection {
                unit: name.to_string(),
                query,
                reason: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Introspect for ShellIntrospector {
    fn description(&self, name: &str, file: &Path) -> Result<String> {
        Ok(self.query(name, file, DESCRIPTION)?.trim().to_string())
    }

    fn dependencies(&self, name: &str, file: &Path) -> Result<Vec<String>> {
        let stdout = self.query(name, file, DEPENDENCIES)?;
        Ok(stdout.split_whitespace().map(str::to_string).collect())
    }
}
