mod check;
mod render;
mod resolve;
mod scopes;

use bundlescope_core::config::BundlescopeConfig;
use bundlescope_runtime::Runtime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "bundlescope",
    version,
    about = "Scope-based static asset bundles for server-rendered pages",
    long_about = "Bundlescope loads JSON bundle definitions that group scripts, stylesheets and \
                  images into named scopes, resolves the ordered asset list a page needs and \
                  renders it as HTML tags."
)]
pub struct Cli {
    /// Configuration file (defaults to $BUNDLESCOPE_CONFIG or the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the assets visible from one or more scopes
    Resolve {
        /// Bundle file or directory
        #[arg(value_name = "BUNDLES")]
        bundles: PathBuf,
        /// Scopes to resolve, left to right
        #[arg(value_name = "SCOPE")]
        scopes: Vec<String>,
    },
    /// Print the HTML tags for one or more scopes
    Render {
        #[arg(value_name = "BUNDLES")]
        bundles: PathBuf,
        #[arg(value_name = "SCOPE")]
        scopes: Vec<String>,
        /// Request context path prepended to local locations
        #[arg(long, default_value = "")]
        context_path: String,
        /// Print cache statistics after rendering
        #[arg(long)]
        stats: bool,
    },
    /// Show the scope hierarchy
    Scopes {
        #[arg(value_name = "BUNDLES")]
        bundles: PathBuf,
    },
    /// Validate bundle definitions
    #[command(
        long_about = "Loads every bundle definition and reports hierarchy violations. \
                            Exits with an error on the first invalid parent declaration."
    )]
    Check {
        #[arg(value_name = "BUNDLES")]
        bundles: PathBuf,
    },
}

/// Runtime with the bundles at `path` loaded on top of the configured ones
pub(crate) fn open_runtime(
    mut config: BundlescopeConfig,
    path: &Path,
) -> Result<Runtime, Box<dyn std::error::Error>> {
    config.bundles.push(path.to_path_buf());
    Ok(bundlescope_runtime::build_default_runtime(config)?)
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = BundlescopeConfig::load_or_default(cli.config.as_deref())?;
    let _guard = bundlescope_runtime::init_logging("cli", &config, false);

    match cli.command {
        Commands::Resolve { bundles, scopes } => resolve::run(config, &bundles, &scopes),
        Commands::Render {
            bundles,
            scopes,
            context_path,
            stats,
        } => render::run(config, &bundles, &scopes, &context_path, stats),
        Commands::Scopes { bundles } => scopes::run(config, &bundles),
        Commands::Check { bundles } => check::run(config, &bundles),
    }
}
