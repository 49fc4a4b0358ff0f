//! Capability catalog records (`catalog.json`)

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Kind of published capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityType {
    Model,
    Service,
}

/// How a consumer imports, constructs and calls the client SDK
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub import: String,
    pub init: String,
    pub example: String,
    pub returns: String,
}

impl Usage {
    /// Name of the first blank field, if any
    fn first_blank_field(&self) -> Option<&'static str> {
        [
            ("usage.import", &self.import),
            ("usage.init", &self.init),
            ("usage.example", &self.example),
            ("usage.returns", &self.returns),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// A capability advertised in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub kind: CapabilityType,
    pub description: String,
    pub host: String,
    /// `"METHOD /path"` strings, in documentation order
    #[serde(default)]
    pub endpoints: Vec<String>,
    pub client_sdk: String,
    pub service_repo: String,
    pub api_docs: String,
    pub version: String,
    pub added_by: String,
    pub added_at: NaiveDate,
    /// Required for publication; optional here so its absence can be reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl CatalogEntry {
    /// Check the entry is complete enough to publish under `name`
    pub fn validate_for_publication(&self, name: &str) -> Result<semver::Version> {
        let usage = self
            .usage
            .as_ref()
            .ok_or_else(|| RegistryError::MissingUsageBlock {
                name: name.to_string(),
                field: "usage",
            })?;

        if let Some(field) = usage.first_blank_field() {
            return Err(RegistryError::MissingUsageBlock {
                name: name.to_string(),
                field,
            });
        }

        self.parsed_version()
    }

    pub fn parsed_version(&self) -> Result<semver::Version> {
        semver::Version::parse(self.version.trim()).map_err(|source| {
            RegistryError::InvalidVersion {
                version: self.version.clone(),
                source,
            }
        })
    }
}

/// The whole `catalog.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Time of the last mutation
    pub updated: DateTime<Utc>,
    /// Capability name -> entry, in file order
    #[serde(default)]
    pub capabilities: IndexMap<String, CatalogEntry>,
}

impl Default for CatalogDocument {
    fn default() -> Self {
        Self {
            updated: Utc::now(),
            capabilities: IndexMap::new(),
        }
    }
}

impl CatalogDocument {
    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }
}

/// Version for a replaced entry.
///
/// A caller-supplied version ahead of the stored one wins; anything else
/// gets the stored version with its patch component incremented.
pub fn bump_version(
    current: &semver::Version,
    proposed: &semver::Version,
) -> Result<semver::Version> {
    if proposed > current {
        return Ok(proposed.clone());
    }
    let patch = current
        .patch
        .checked_add(1)
        .ok_or_else(|| RegistryError::VersionExhausted(current.to_string()))?;
    Ok(semver::Version::new(current.major, current.minor, patch))
}
