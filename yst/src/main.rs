use std::fs;
use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context as _, Result, bail};
use serde_json::Value;
use tracing::{debug, info};

use yst::check::check_bundle;
use yst::cli::{Cli, Command};
use yst::config::Config;
use yst::debug::print_template;
use yst::{Bundle, Engine, Params, Registry, ValueSet};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = match cli_log_level.map(str::to_uppercase).as_deref() {
        None => tracing::Level::WARN,
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", other);
            tracing::Level::WARN
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!(?level, "Logging initialized");
    Ok(())
}

fn load_bundle(path: &Path) -> Result<Bundle> {
    Bundle::load(path).context(format!("Failed to load bundle from {}", path.display()))
}

/// Read the data file; an array is the value set, an object also exposes its keys as globals
fn load_data(engine: &mut Engine, path: &Path) -> Result<ValueSet> {
    let content = fs::read_to_string(path).context(format!("Failed to read data file {}", path.display()))?;
    let data: Value = serde_json::from_str(&content).context(format!("Failed to parse data file {}", path.display()))?;

    match data {
        Value::Array(values) => Ok(ValueSet::single(values)),
        Value::Object(map) => {
            let value_set = match map.get("values") {
                Some(Value::Array(values)) => ValueSet::single(values.clone()),
                _ => ValueSet::empty(),
            };
            for (name, value) in map {
                engine.set_global(name, value);
            }
            Ok(value_set)
        }
        other => bail!("Data file must hold a JSON array or object, found {}", other),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_render(
    mut config: Config,
    bundle_path: &Path,
    name: &str,
    data: Option<&Path>,
    params: Option<&str>,
    literal: bool,
    strict: bool,
    multi_set: bool,
) -> Result<()> {
    if strict {
        config.alert_errors = false;
    }
    if multi_set {
        config.allow_multi_set = true;
    }

    let bundle = load_bundle(bundle_path)?;
    let template = bundle.get(name).cloned();
    let mut engine = Engine::new(config).with_registry(Registry::from_bundle(bundle));

    let value_set = match data {
        Some(path) => load_data(&mut engine, path)?,
        None => ValueSet::empty(),
    };
    let params: Params = match params {
        Some(text) => serde_json::from_str(text).context("Failed to parse --params as a JSON object")?,
        None => Params::new(),
    };
    let ctx = yst::Context::new(value_set, 0, params);

    info!(name, literal, "Rendering template");
    let html = if literal {
        let Some(template) = template else {
            bail!("Template not found: {}", name);
        };
        engine.literal(&ctx, None, &template)?
    } else {
        engine.render(name, &ctx)?
    };

    println!("{}", html);
    Ok(())
}

fn cmd_print(bundle_path: &Path, name: Option<&str>) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;

    if let Some(name) = name
        && bundle.get(name).is_none()
    {
        bail!("Template not found: {}", name);
    }

    for (template_name, template) in &bundle.templates {
        if name.is_some_and(|n| n != template_name.as_str()) {
            continue;
        }
        println!("{}", template_name.cyan());
        println!("{}", print_template(template, ""));
    }
    Ok(())
}

fn cmd_check(config: &Config, bundle_path: &Path) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;
    let problems = check_bundle(&bundle, config.allow_multi_set);

    if problems.is_empty() {
        println!("{} {} templates OK", "✓".green(), bundle.templates.len());
        return Ok(());
    }

    for problem in &problems {
        println!("{} {}", "✗".red(), problem);
    }
    bail!("{} problem(s) found", problems.len())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    debug!(?config, "main: loaded config");

    match cli.command {
        Command::Render {
            bundle,
            name,
            data,
            params,
            literal,
            strict,
            multi_set,
        } => cmd_render(
            config,
            &bundle,
            &name,
            data.as_deref(),
            params.as_deref(),
            literal,
            strict,
            multi_set,
        ),
        Command::Print { bundle, name } => cmd_print(&bundle, name.as_deref()),
        Command::Check { bundle } => cmd_check(&config, &bundle),
    }
}
