//! Error types for unit discovery and execution.
//!
//! Every failure carries the unit or environment name it belongs to.
//! Wrapper variants ([`Error::Hydration`], [`Error::Environment`]) add one
//! layer of context each and keep the underlying failure as their source.

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A unit or environment name could not be resolved
    NotFound,
    /// A `description` or `dependencies` query failed
    IntrospectionFailure,
    /// A unit's script exited non-zero or could not be started
    ExecutionFailure,
    /// Hydration aborted because some unit failed to load
    GraphConstructionFailure,
    /// The dependency graph contains a cycle
    CycleDetected,
    /// Filesystem error outside of unit execution
    Io,
    /// The environments file could not be parsed
    InvalidEnvironments,
}

/// Errors produced by the unit graph.
#[derive(Debug, Error)]
pub enum Error {
    /// Unit name absent from the hydrated graph
    #[error("unit '{name}' not found")]
    UnitNotFound {
        /// Requested unit name
        name: String,
    },

    /// Environment name absent from the environments file
    #[error("environment '{name}' not found")]
    EnvironmentNotFound {
        /// Requested environment name
        name: String,
    },

    /// A query subprocess for a unit failed
    #[error("failed to get {query} for {unit}: {reason}{}", format_stderr(.stderr))]
    Introspection {
        /// Unit being queried
        unit: String,
        /// Query name (`description` or `dependencies`)
        query: &'static str,
        /// Exit status or spawn error
        reason: String,
        /// Captured standard error of the query
        stderr: String,
    },

    /// A unit's script failed
    #[error("execution of '{unit}' failed: {reason}")]
    Execution {
        /// Unit that failed
        unit: String,
        /// Exit status or spawn error
        reason: String,
    },

    /// Loading a unit (or one of its dependencies) failed during hydration
    #[error("failed to load unit '{unit}'")]
    Hydration {
        /// Unit whose loading was aborted
        unit: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Dependency cycle found while loading units
    #[error("dependency cycle detected: {}", .path.join(" -> "))]
    Cycle {
        /// Units on the cycle, first entry repeated at the end
        path: Vec<String>,
    },

    /// Applying one unit of an environment failed
    #[error("failed to apply unit '{unit}' from environment '{environment}'")]
    Environment {
        /// Environment being applied
        environment: String,
        /// Listed unit whose run failed
        unit: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// The units directory could not be read
    #[error("failed to read units directory {}", .path.display())]
    UnitsDir {
        /// Path of the units directory
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// The environments file could not be read
    #[error("failed to read environments file {}", .path.display())]
    EnvironmentsRead {
        /// Path of the environments file
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// The environments file is not a valid list of environments
    #[error("failed to parse environments file {}", .path.display())]
    EnvironmentsParse {
        /// Path of the environments file
        path: PathBuf,
        /// YAML error
        #[source]
        source: serde_yaml::Error,
    },
}

fn format_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(" (stderr: {stderr})")
    }
}

impl Error {
    /// Classify this error.
    ///
    /// Environment wrappers report the kind of the failure they wrap.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnitNotFound { .. } | Self::EnvironmentNotFound { .. } => ErrorKind::NotFound,
            Self::Introspection { .. } => ErrorKind::IntrospectionFailure,
            Self::Execution { .. } => ErrorKind::ExecutionFailure,
            Self::Hydration { .. } => ErrorKind::GraphConstructionFailure,
            Self::Cycle { .. } => ErrorKind::CycleDetected,
            Self::Environment { source, .. } => source.kind(),
            Self::UnitsDir { .. } | Self::EnvironmentsRead { .. } => ErrorKind::Io,
            Self::EnvironmentsParse { .. } => ErrorKind::InvalidEnvironments,
        }
    }

    /// Innermost error below any hydration or environment wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Hydration { source, .. } | Self::Environment { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Name of the unit this failure is attributed to, if any.
    ///
    /// For wrapped errors this is the innermost unit, so a failing
    /// dependency is reported instead of the unit that requested it.
    pub fn unit(&self) -> Option<&str> {
        match self.root_cause() {
            Self::UnitNotFound { name } => Some(name.as_str()),
            Self::Introspection { unit, .. } | Self::Execution { unit, .. } => Some(unit.as_str()),
            Self::Cycle { path } => path.last().map(String::as_str),
            _ => None,
        }
    }
}

/// Result alias for unit graph operations.
pub type Result<T> = std::result::Result<T, Error>;
