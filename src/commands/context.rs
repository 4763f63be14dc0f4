use anyhow::Result;
use std::path::Path;

use crate::Context;
use crate::config::YaduConfig;
use crate::{paths, ui};

pub fn run(_ctx: &Context, directory: Option<&str>) -> Result<()> {
    let mut config = YaduConfig::load()?;

    let Some(directory) = directory else {
        if config.context.is_empty() {
            ui::info("No context directory configured");
        } else {
            println!("{}", config.context);
        }
        return Ok(());
    };

    let expanded = paths::expand(directory);
    let stored = absolute(&expanded);
    if !stored.join(unitgraph::UNITS_DIR).is_dir() {
        ui::warn(&format!(
            "{} has no {}/ directory yet",
            stored.display(),
            unitgraph::UNITS_DIR
        ));
    }

    config.set_context(&stored.display().to_string());
    config.save()?;
    ui::success(&format!("Context set to {}", stored.display()));
    Ok(())
}

/// Make a path absolute without requiring it to exist
fn absolute(path: &Path) -> std::path::PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
