//! Client SDK conformance checker
//!
//! Evaluates a [`ClientDescriptor`] (a structural summary of a hand-written
//! HTTP client module, produced by an external source inspector) against the
//! sandbox SDK rules. Every check always runs and always yields an outcome;
//! a failing check is a reportable result, not an error.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

pub mod rules;


use rules::*;

/// One declared parameter of a constructor or method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Default value as written in source, e.g. `"http://10.0.0.5:8000"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Parameter {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    /// `self` / `cls`
    pub fn is_receiver(&self) -> bool {
        matches!(self.name.as_str(), "self" | "cls")
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.is_receiver()
    }
}

/// A declared method of the client class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

/// Structural summary of a candidate client module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDescriptor {
    /// Module name, e.g. `yolo_client`
    #[serde(default)]
    pub module: String,
    /// Dotted names of everything the module imports
    #[serde(default)]
    pub imports: Vec<String>,
    /// Types the module itself defines (importable from within the package)
    #[serde(default)]
    pub declared_types: Vec<String>,
    /// Constructor parameters, `None` when no constructor was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<Vec<Parameter>>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    /// Module-level description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl ClientDescriptor {
    /// Load a descriptor produced by the source inspector
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read client descriptor: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse client descriptor: {}", path.display()))
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    pub fn pass(check: &str, detail: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(check: &str, detail: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Ordered outcomes of every check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub module: String,
    pub outcomes: Vec<CheckOutcome>,
}

impl ConformanceReport {
    /// Overall pass: every check passed
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn outcome(&self, check: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.check == check)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }
}

/// Trait for conformance checks
pub trait ConformanceRule: Send + Sync {
    /// Evaluate the descriptor; never fails
    fn evaluate(&self, descriptor: &ClientDescriptor) -> CheckOutcome;

    /// Check identifier as it appears in reports
    fn check_name(&self) -> &'static str;

    fn description(&self) -> &'static str;
}

/// Runs the fixed battery of SDK checks
pub struct ConformanceChecker {
    rules: Vec<Box<dyn ConformanceRule>>,
}

impl ConformanceChecker {
    /// Checker with the standard sandbox SDK rules, in report order
    pub fn new() -> Self {
        let rules: Vec<Box<dyn ConformanceRule>> = vec![
            Box::new(ForbiddenImportsRule),
            Box::new(AllowedImportsOnlyRule),
            Box::new(ConstructorHostParamRule),
            Box::new(HealthMethodRule),
            Box::new(ImageInputPolymorphismRule),
            Box::new(ModuleDocstringUsageRule),
        ];

        Self { rules }
    }

    /// Check identifiers and descriptions, in report order
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.check_name(), r.description()))
    }

    pub fn check(&self, descriptor: &ClientDescriptor) -> ConformanceReport {
        debug!("Checking client module: {}", descriptor.module);

        let outcomes: Vec<CheckOutcome> = self
            .rules
            .iter()
            .map(|rule| rule.evaluate(descriptor))
            .collect();

        let report = ConformanceReport {
            module: descriptor.module.clone(),
            outcomes,
        };

        info!(
            module = %report.module,
            passed = report.passed(),
            failures = report.failures().count(),
            "Conformance check complete"
        );
        report
    }
}

impl Default for ConformanceChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a descriptor with the standard rules
pub fn check(descriptor: &ClientDescriptor) -> ConformanceReport {
    ConformanceChecker::new().check(descriptor)
}
