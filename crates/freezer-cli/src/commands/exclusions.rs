use crate::commands::absolute_path;
use crate::errors::CliError;
use crate::GlobalOpts;
use clap::Args;
use colored::*;
use freezer_config::BundleRules;
use freezer_manifest::ManifestResolver;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ExclusionsCommand {
    /// Project root used to find freezer.toml
    #[arg(default_value = ".")]
    pub project: PathBuf,

    /// Rules file (default: <project>/freezer.toml)
    #[arg(long, env = "FREEZER_RULES")]
    pub rules: Option<PathBuf>,
}

/// Handle `freezer exclusions`
pub fn handle_exclusions(cmd: ExclusionsCommand, opts: GlobalOpts) -> Result<(), CliError> {
    let project_root = absolute_path(&cmd.project)?;
    let rules = BundleRules::load(cmd.rules.as_deref(), &project_root)?;
    let exclusions = ManifestResolver::new(project_root, rules).list_exclusions();

    println!("{}", "Excluded directories:".bold().green());
    for dir in &exclusions.dirs {
        println!("  {}/", dir.cyan());
    }
    println!("{}", "Excluded files:".bold().green());
    for file in &exclusions.files {
        println!("  {}", file.cyan());
    }

    if opts.verbosity_level() > 0 && !exclusions.is_empty() {
        println!(
            "{}",
            "These stay user-editable: copy them next to the executable after packaging.".yellow()
        );
    }
    Ok(())
}
