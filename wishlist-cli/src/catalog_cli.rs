//! Catalog CLI commands
//!
//! Publish, update and browse capabilities. Entries are read from JSON files
//! in the `catalog.json` entry shape.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use wishlist_core::registry::{CapabilityType, CatalogEntry};
use wishlist_core::store::JsonFileStore;
use wishlist_core::Registry;

/// Catalog subcommand for publishing and browsing capabilities
#[derive(Parser, Debug)]
pub struct CatalogCommand {
    #[clap(subcommand)]
    pub command: CatalogSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CatalogSubcommand {
    /// Publish a new capability
    Publish {
        /// Capability name, e.g. yolo-segmentation
        name: String,

        /// JSON file holding the entry
        #[clap(long)]
        entry: PathBuf,
    },

    /// Replace a published capability and bump its version
    Update {
        name: String,

        #[clap(long)]
        entry: PathBuf,
    },

    /// Show one capability as JSON
    Show { name: String },

    /// List published capabilities
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Remove a capability
    Remove { name: String },
}

impl CatalogCommand {
    pub fn execute(self, registry: &Registry<JsonFileStore>) -> Result<()> {
        match self.command {
            CatalogSubcommand::Publish { name, entry } => {
                let entry = read_entry(&entry)?;
                let published = registry.publish_catalog_entry(&name, entry)?;
                println!("Published '{name}' v{}", published.version);
            }
            CatalogSubcommand::Update { name, entry } => {
                let entry = read_entry(&entry)?;
                let updated = registry.update_catalog_entry(&name, entry)?;
                println!("Updated '{name}' to v{}", updated.version);
            }
            CatalogSubcommand::Show { name } => {
                let entry = registry.get_catalog_entry(&name)?;
                println!("{}", serde_json::to_string_pretty(&entry)?);
            }
            CatalogSubcommand::List { json } => execute_list(registry, json)?,
            CatalogSubcommand::Remove { name } => {
                registry.remove_catalog_entry(&name)?;
                println!("Removed '{name}'");
            }
        }

        Ok(())
    }
}

fn read_entry(path: &Path) -> Result<CatalogEntry> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog entry: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog entry: {}", path.display()))
}

/// Table row for catalog listings
#[derive(Tabled)]
struct CapabilityRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Endpoints")]
    endpoints: usize,
}

fn execute_list(registry: &Registry<JsonFileStore>, json: bool) -> Result<()> {
    let capabilities = registry.list_catalog()?;

    if json {
        // an array keeps document order
        let json_results: Vec<serde_json::Value> = capabilities
            .iter()
            .map(|(name, entry)| serde_json::json!({ "name": name, "entry": entry }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    if capabilities.is_empty() {
        println!("No capabilities published.");
        return Ok(());
    }

    let table_rows: Vec<CapabilityRow> = capabilities
        .iter()
        .map(|(name, entry)| CapabilityRow {
            name: name.clone(),
            kind: match entry.kind {
                CapabilityType::Model => "model".to_string(),
                CapabilityType::Service => "service".to_string(),
            },
            version: entry.version.clone(),
            host: entry.host.clone(),
            endpoints: entry.endpoints.len(),
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("Found {} capabilities\n", table_rows.len());
    println!("{table}");
    Ok(())
}
