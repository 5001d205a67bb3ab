use crate::commands::absolute_path;
use crate::errors::CliError;
use crate::logger;
use crate::GlobalOpts;
use clap::{Args, ValueEnum};
use colored::*;
use freezer_config::venv_paths::{active_environment, resolve_python_exe};
use freezer_config::BundleRules;
use freezer_manifest::{manifest_writer, ManifestFormat, ManifestResolver, Resolution, Summary};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct ResolveCommand {
    /// Project root containing the entry script
    #[arg(default_value = ".")]
    pub project: PathBuf,

    /// Dependency environment (default: .venv or venv under the project)
    #[arg(long)]
    pub venv: Option<PathBuf>,

    /// Active Python environment (default: $VIRTUAL_ENV, then $CONDA_PREFIX)
    #[arg(long)]
    pub active_env: Option<PathBuf>,

    /// Locate the GUI toolkit by importing it with this interpreter
    #[arg(long, conflicts_with = "probe_python")]
    pub python: Option<PathBuf>,

    /// Locate the GUI toolkit with the environment's interpreter or python3 on PATH
    #[arg(long)]
    pub probe_python: bool,

    /// Rules file (default: <project>/freezer.toml)
    #[arg(long, env = "FREEZER_RULES")]
    pub rules: Option<PathBuf>,

    /// Write the manifest here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Manifest format (default: from the output extension, else toml)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Toml,
    Json,
}

impl From<FormatArg> for ManifestFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Toml => ManifestFormat::Toml,
            FormatArg::Json => ManifestFormat::Json,
        }
    }
}

impl ResolveCommand {
    fn manifest_format(&self) -> ManifestFormat {
        match (self.format, &self.output) {
            (Some(format), _) => format.into(),
            (None, Some(path)) => ManifestFormat::from_path(path),
            (None, None) => ManifestFormat::Toml,
        }
    }
}

/// Pick the interpreter used to import the toolkit, if probing was requested.
fn select_interpreter(
    cmd: &ResolveCommand,
    environment_root: Option<&Path>,
) -> Result<Option<PathBuf>, CliError> {
    if let Some(python) = &cmd.python {
        return Ok(Some(python.clone()));
    }
    if !cmd.probe_python {
        return Ok(None);
    }

    if let Some(env) = environment_root {
        match resolve_python_exe(env) {
            Ok(python) => return Ok(Some(python)),
            Err(e) => logger::debug(&format!("No interpreter in environment: {}", e)),
        }
    }

    ["python3", "python"]
        .iter()
        .find_map(|name| which::which(name).ok())
        .map(Some)
        .ok_or(CliError::NoInterpreter)
}

/// Build the resolver for a command: rules, environment and interpreter.
pub fn build_resolver(cmd: &ResolveCommand) -> Result<ManifestResolver, CliError> {
    let project_root = absolute_path(&cmd.project)?;

    let rules = BundleRules::load(cmd.rules.as_deref(), &project_root)?;
    logger::debug(&format!("Entry script: {}", rules.entry_script));

    let environment_root = cmd.venv.as_deref().map(absolute_path).transpose()?;
    let active_env = match &cmd.active_env {
        Some(path) => Some(absolute_path(path)?),
        None => active_environment(|var| std::env::var(var).ok()),
    };

    let resolver = ManifestResolver::new(project_root, rules)
        .with_environment_root(environment_root)
        .detect_environment()
        .with_active_environment(active_env);

    let interpreter = select_interpreter(cmd, resolver.environment_root())?;
    if let Some(python) = &interpreter {
        logger::debug(&format!("Probing toolkit with {}", python.display()));
    }

    Ok(resolver.with_interpreter(interpreter))
}

fn report(resolution: &Resolution) {
    eprintln!("{}", "Bundle summary:".bold().green());
    for line in Summary::new(resolution).to_string().lines() {
        logger::step(line);
        eprintln!("  {}", line);
    }
}

/// Handle `freezer resolve`
pub fn handle_resolve(cmd: ResolveCommand, _opts: GlobalOpts) -> Result<(), CliError> {
    let resolver = build_resolver(&cmd)?;

    logger::step(&format!(
        "Resolving bundle manifest for {}",
        resolver.project_root().display()
    ));
    let resolution = resolver.resolve()?;

    let format = cmd.manifest_format();
    match &cmd.output {
        Some(path) => {
            manifest_writer::write_to_path(&resolution.manifest, path, format)?;
        }
        None => {
            let content = manifest_writer::to_string(&resolution.manifest, format)?;
            println!("{}", content.trim_end());
        }
    }

    report(&resolution);

    if let Some(path) = &cmd.output {
        logger::success(&format!("Manifest written to {}", path.display()));
    }
    Ok(())
}
