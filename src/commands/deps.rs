use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use unitgraph::UnitId;

use crate::Context;
use crate::commands::load_units;

pub fn run(ctx: &Context, unit: &str) -> Result<()> {
    let units = load_units(ctx)?;
    let root = units.require(unit)?;

    let mut shown = HashSet::new();
    print_tree(&units, root, "", true, true, &mut shown);
    Ok(())
}

/// Print a unit and its dependencies as a tree.
///
/// Subtrees already printed are collapsed to a single dimmed line.
fn print_tree(
    units: &unitgraph::Context,
    id: UnitId,
    prefix: &str,
    is_root: bool,
    is_last: bool,
    shown: &mut HashSet<UnitId>,
) {
    let unit = units.unit(id);
    let connector = match (is_root, is_last) {
        (true, _) => "",
        (false, true) => "└── ",
        (false, false) => "├── ",
    };

    let first_visit = shown.insert(id);
    if first_visit || unit.dependencies().is_empty() {
        println!("{prefix}{connector}{}", unit.name().bold());
    } else {
        println!("{prefix}{connector}{}", format!("{} (see above)", unit.name()).dimmed());
        return;
    }

    let child_prefix = match (is_root, is_last) {
        (true, _) => String::new(),
        (false, true) => format!("{prefix}    "),
        (false, false) => format!("{prefix}│   "),
    };
    let deps = unit.dependencies();
    for (i, &dep) in deps.iter().enumerate() {
        print_tree(units, dep, &child_prefix, false, i + 1 == deps.len(), shown);
    }
}
