use anyhow::Context;
use clap::{Parser, Subcommand};
use freezer::{
    commands::{
        exclusions::{self, ExclusionsCommand},
        resolve::{self, ResolveCommand},
        rules::{self, RulesCommand},
    },
    logger, GlobalOpts,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "freezer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Bundle manifest resolver",
    long_about = "freezer decides what a packaged desktop application bundle contains: resource directories, excluded user data, GUI toolkit plugins and hidden imports."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the bundle manifest for a project
    Resolve(ResolveCommand),
    /// List directories and files kept out of the bundle
    Exclusions(ExclusionsCommand),
    /// Print the effective bundle rules
    Rules(RulesCommand),
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logger::verbosity_to_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Resolve(cmd) => {
            resolve::handle_resolve(cmd, cli.global).context("Resolve command failed")
        }
        Commands::Exclusions(cmd) => exclusions::handle_exclusions(cmd, cli.global)
            .context("Exclusions command failed"),
        Commands::Rules(cmd) => {
            rules::handle_rules(cmd, cli.global).context("Rules command failed")
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    if let Err(e) = run(cli) {
        logger::error(&format!("{:#}", e));
        if logger::get_verbosity() > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
