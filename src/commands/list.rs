use anyhow::Result;
use colored::Colorize;
use unitgraph::ShellIntrospector;

use crate::Context;
use crate::commands::load_units;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let units = load_units(ctx)?;

    if units.is_empty() {
        ui::warn(&format!(
            "No units found in {}",
            units.units_dir().display()
        ));
        return Ok(());
    }

    for (name, description) in units.describe(&ShellIntrospector::default())? {
        println!("{}: {}", name.bold().bright_blue(), description);
    }
    Ok(())
}
