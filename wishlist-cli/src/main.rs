//! Wishlist - capability wishlist, catalog and client SDK conformance CLI

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use wishlist_core::config::{RegistryConfig, PROJECT_CONFIG_FILE};
use wishlist_core::conformance::{ClientDescriptor, ConformanceChecker};
use wishlist_core::store::JsonFileStore;
use wishlist_core::Registry;

mod catalog_cli;
mod wish_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "wishlist",
    about = "Capability wishlist, catalog and client SDK conformance checks",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Registry config file (defaults to discovery)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Override the wishlist document path
    #[clap(long, global = true)]
    wishlist: Option<PathBuf>,

    /// Override the catalog document path
    #[clap(long, global = true)]
    catalog: Option<PathBuf>,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

#[derive(Parser, Debug)]
enum Command {
    /// File, vote on and move wishlist items
    Wish(wish_cli::WishCommand),

    /// Publish and browse capabilities
    Catalog(catalog_cli::CatalogCommand),

    /// Check a client descriptor against the SDK rules
    Check {
        /// Descriptor JSON produced by the source inspector
        descriptor: PathBuf,

        /// Output the report as JSON
        #[clap(long)]
        json: bool,
    },

    /// Write a project config and empty documents in the working directory
    Init {
        /// Overwrite an existing config
        #[clap(long)]
        force: bool,
    },
}

/// Initialize tracing; logs go to stderr so stdout stays parseable
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_registry(
    cli_config: Option<PathBuf>,
    wishlist: Option<PathBuf>,
    catalog: Option<PathBuf>,
) -> Result<Registry<JsonFileStore>> {
    let config = RegistryConfig::discover(cli_config)?.with_overrides(wishlist, catalog);
    debug!(
        "Using wishlist {} and catalog {}",
        config.wishlist_path.display(),
        config.catalog_path.display()
    );
    Ok(Registry::new(config.open_store()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);

    match cli.command {
        Command::Wish(command) => {
            let registry = open_registry(cli.config, cli.wishlist, cli.catalog)?;
            command.execute(&registry)
        }
        Command::Catalog(command) => {
            let registry = open_registry(cli.config, cli.wishlist, cli.catalog)?;
            command.execute(&registry)
        }
        Command::Check { descriptor, json } => check_command(descriptor, json),
        Command::Init { force } => init_command(force),
    }
}

fn check_command(path: PathBuf, json: bool) -> Result<()> {
    let descriptor = ClientDescriptor::from_file(&path)?;
    let report = ConformanceChecker::new().check(&descriptor);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let name = if report.module.is_empty() {
            path.display().to_string()
        } else {
            report.module.clone()
        };
        println!("Conformance report for {name}\n");
        for outcome in &report.outcomes {
            let mark = if outcome.passed { "PASS" } else { "FAIL" };
            println!("  [{mark}] {:<26} {}", outcome.check, outcome.detail);
        }
        let failed = report.failures().count();
        if failed == 0 {
            println!("\nAll {} checks passed", report.outcomes.len());
        } else {
            println!("\n{failed} of {} checks failed", report.outcomes.len());
        }
    }

    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn init_command(force: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let config_path = cwd.join(PROJECT_CONFIG_FILE);

    if config_path.exists() && !force {
        println!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        );
        return Ok(());
    }

    // paths in the file are relative to .wishlist/
    let config = RegistryConfig {
        wishlist_path: PathBuf::from("../wishlist.json"),
        catalog_path: PathBuf::from("../catalog.json"),
    };
    config.save_to_path(&config_path)?;
    println!("Wrote {}", config_path.display());

    // existing documents are left as they are
    let resolved = RegistryConfig::load_from_path(&config_path)?;
    if !resolved.wishlist_path.exists() {
        std::fs::write(&resolved.wishlist_path, "[]\n")
            .with_context(|| format!("Failed to create {}", resolved.wishlist_path.display()))?;
        println!("Created {}", resolved.wishlist_path.display());
    }
    if !resolved.catalog_path.exists() {
        let empty = wishlist_core::registry::CatalogDocument::default();
        std::fs::write(&resolved.catalog_path, serde_json::to_string_pretty(&empty)? + "\n")
            .with_context(|| format!("Failed to create {}", resolved.catalog_path.display()))?;
        println!("Created {}", resolved.catalog_path.display());
    }

    Ok(())
}
