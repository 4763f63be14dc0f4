use anyhow::Result;
use unitgraph::{Engine, ShellRunner};

use crate::Context;
use crate::cli::ApplyArgs;
use crate::commands::{ConsoleProgress, load_units, show_plan};
use crate::ui;

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let units = load_units(ctx)?;
    let include_dependencies = !args.no_deps;
    let mut engine = Engine::new(&units, ShellRunner::default());

    if args.dry_run {
        ui::header(&format!("Apply {}", args.unit));
        let plan = engine.plan(&args.unit, include_dependencies)?;
        show_plan(&units, &plan);
        return Ok(());
    }

    let mut progress = ConsoleProgress::new(ctx);
    engine.run_unit_with(&args.unit, include_dependencies, &mut progress)?;

    if !ctx.quiet {
        ui::success(&format!(
            "Applied {} ({} units run)",
            args.unit,
            progress.completed()
        ));
    }
    Ok(())
}
