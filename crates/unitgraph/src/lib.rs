//! # Unitgraph
//!
//! Discovery and dependency-ordered execution of configuration units.
//!
//! ## Core Concepts
//!
//! - **Unit**: an executable script in `<context>/units/` that can describe
//!   itself and name the units it depends on
//! - **Context**: the graph of every unit found under one context directory
//! - **Engine**: runs a unit after its transitive dependencies, each unit at
//!   most once per engine
//! - **Environment**: a named list of units applied in order
//!
//! ## Example
//!
//! ```ignore
//! use unitgraph::{Context, Engine, ShellIntrospector, ShellRunner};
//!
//! let ctx = Context::hydrate("/home/me/dotfiles", &ShellIntrospector::default())?;
//! let mut engine = Engine::new(&ctx, ShellRunner::default());
//! engine.run_unit("nvim", true)?;
//! engine.apply_named_environment("laptop", &mut unitgraph::NoProgress)?;
//! ```
//!
//! Introspection and execution are behind the [`Introspect`] and [`Runner`]
//! traits so the graph does not depend on how units are implemented.

pub mod engine;
pub mod environment;
pub mod error;
pub mod graph;
pub mod introspect;

pub use engine::{Engine, Ledger, NoProgress, RunProgress, Runner, ShellRunner};
pub use environment::{
    ENVIRONMENTS_FILE, Environment, environments_file, find_environment, load_environments,
};
pub use error::{Error, ErrorKind, Result};
pub use graph::{Context, UNITS_DIR, Unit, UnitId};
pub use introspect::{Introspect, QUERY_ENV, ShellIntrospector};
