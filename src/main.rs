use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use docs_conf::matching::{matching_source_files, normalize_path};
use docs_conf::settings::VersionSourceSettings;
use docs_conf::{emit, BuildConfig, ConfigLoader, LoaderSettings};

#[derive(Parser)]
#[command(name = "docs-conf")]
#[command(about = "Load and inspect the TileFusion documentation build configuration")]
struct Cli {
    /// Loader settings file (default: docs-conf.toml under --base-dir)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Directory relative version-source paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    /// Read the version from this file instead (a .py module or a pyproject.toml)
    #[arg(long, global = true)]
    version_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full configuration mapping as JSON
    Show,
    /// Print a single key as JSON
    Get { key: String },
    /// Render the configuration as a conf.py module
    Emit {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List source files that survive exclude_patterns
    Sources { dir: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = load_config(&cli).context("Failed to load documentation configuration")?;

    match cli.command {
        Commands::Show => {
            println!("{}", emit::to_json(&config)?);
        }
        Commands::Get { key } => {
            println!("{}", lookup(&config, &key)?);
        }
        Commands::Emit { output } => {
            let conf_py = emit::to_conf_py(&config);
            match output {
                Some(path) => {
                    std::fs::write(&path, conf_py)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {}", path.display());
                }
                None => print!("{}", conf_py),
            }
        }
        Commands::Sources { dir } => {
            for file in matching_source_files(&dir, &config)? {
                println!("{}", normalize_path(&file));
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<BuildConfig> {
    let mut settings = LoaderSettings::load(cli.settings.as_deref(), &cli.base_dir)?;

    if let Some(path) = &cli.version_file {
        settings.version_source = VersionSourceSettings::from_file(path);
    }

    let loader = ConfigLoader::from_settings(&settings, &cli.base_dir)?;
    Ok(loader.load()?)
}

/// Pretty JSON of one key; unrecognized keys are an error.
fn lookup(config: &BuildConfig, key: &str) -> Result<String> {
    let value = config
        .get(key)
        .ok_or_else(|| anyhow!("Unrecognized configuration key '{}'", key))?;
    Ok(serde_json::to_string_pretty(&value)?)
}
