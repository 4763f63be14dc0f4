use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use unitgraph::{Engine, Environment, ShellRunner, find_environment, load_environments};

use crate::Context;
use crate::cli::EnvCommand;
use crate::commands::{ConsoleProgress, load_units, show_plan};
use crate::config::YaduConfig;
use crate::ui;

pub fn run(ctx: &Context, cmd: EnvCommand) -> Result<()> {
    match cmd {
        EnvCommand::List => list(ctx),
        EnvCommand::Current => current(),
        EnvCommand::Use { name } => select(ctx, &name),
        EnvCommand::Apply { name, dry_run } => apply(ctx, name.as_deref(), dry_run),
    }
}

fn environments(ctx: &Context) -> Result<Vec<Environment>> {
    let dir = ctx.context_dir()?;
    load_environments(&dir).context("Failed to load environments")
}

fn list(ctx: &Context) -> Result<()> {
    let environments = environments(ctx)?;
    let config = YaduConfig::load()?;
    let active = config.active_environment();

    if environments.is_empty() {
        ui::warn("No environments defined");
        return Ok(());
    }

    ui::header("Environments");
    for env in &environments {
        let marker = if active == Some(env.name.as_str()) {
            "*".green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!("{marker} {}", env.name.bold());
        ui::dim(&env.units.join(", "));
    }
    Ok(())
}

fn current() -> Result<()> {
    match YaduConfig::load()?.active_environment() {
        Some(name) => println!("{name}"),
        None => ui::info("No active environment. Select one with 'yadu env use <name>'"),
    }
    Ok(())
}

fn select(ctx: &Context, name: &str) -> Result<()> {
    let environments = environments(ctx)?;
    find_environment(&environments, name)?;

    let mut config = YaduConfig::load()?;
    config.set_environment(name);
    config.save()?;
    ui::success(&format!("Active environment set to {name}"));
    Ok(())
}

fn apply(ctx: &Context, name: Option<&str>, dry_run: bool) -> Result<()> {
    let config = YaduConfig::load()?;
    let name = match name.or_else(|| config.active_environment()) {
        Some(name) => name.to_string(),
        None => bail!("No environment given and none is active. Use 'yadu env use <name>'"),
    };

    let units = load_units(ctx)?;
    let environments = load_environments(units.directory())
        .context("Failed to load environments")?;
    let mut engine = Engine::new(&units, ShellRunner::default());

    if dry_run {
        ui::header(&format!("Environment {name}"));
        let plan = engine.plan_environment(&environments, &name)?;
        show_plan(&units, &plan);
        return Ok(());
    }

    if !ctx.quiet {
        ui::kv("Applying environment", &name.bold().bright_blue().to_string());
    }
    let mut progress = ConsoleProgress::new(ctx);
    engine.apply_environment_with(&environments, &name, &mut progress)?;

    if !ctx.quiet {
        ui::success(&format!(
            "Applied environment {name} ({} units run)",
            progress.completed()
        ));
    }
    Ok(())
}
