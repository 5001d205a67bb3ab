use crate::commands::absolute_path;
use crate::errors::CliError;
use crate::logger;
use crate::GlobalOpts;
use clap::Args;
use freezer_config::BundleRules;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct RulesCommand {
    /// Project root used to find freezer.toml
    #[arg(default_value = ".")]
    pub project: PathBuf,

    /// Rules file (default: <project>/freezer.toml)
    #[arg(long, env = "FREEZER_RULES")]
    pub rules: Option<PathBuf>,
}

/// Handle `freezer rules`: print the effective rules as TOML
pub fn handle_rules(cmd: RulesCommand, _opts: GlobalOpts) -> Result<(), CliError> {
    let project_root = absolute_path(&cmd.project)?;

    match BundleRules::locate(cmd.rules.as_deref(), &project_root) {
        Some(path) => logger::info(&format!("Rules file: {}", path.display())),
        None => logger::info("Rules file: (built-in defaults)"),
    }

    let rules = BundleRules::load(cmd.rules.as_deref(), &project_root)?;
    print!("{}", rules.to_toml()?);
    Ok(())
}
