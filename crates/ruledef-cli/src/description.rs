//! # Build Descriptions
//!
//! Loads the targets of a build description from YAML or JSON.
//!
//! ```yaml
//! targets:
//!   - rule: objc_bundle
//!     attributes:
//!       name: assets
//!       bundle_imports: [a.bundle/x.png]
//! ```
//!
//! The format is chosen from the file extension: `.yaml`/`.yml` for YAML,
//! anything else for JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ruledef_core::AttributeValue;
use ruledef_schema::RawAttributes;

/// A parsed build description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildDescription {
    /// Targets in file order.
    #[serde(default)]
    pub targets: Vec<TargetDecl>,
}

/// One target: its rule type and raw attribute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetDecl {
    /// Rule type name.
    pub rule: String,
    /// Attribute values as written.
    #[serde(default)]
    pub attributes: RawAttributes,
}

impl TargetDecl {
    /// Display name: the `name` attribute when it is text, else `#<index>`.
    pub fn display_name(&self, index: usize) -> String {
        match self.attributes.get("name") {
            Some(AttributeValue::Text(name)) => format!(":{name}"),
            _ => format!("#{index}"),
        }
    }
}

impl BuildDescription {
    /// Parse a description from text in the given format.
    pub fn parse(content: &str, yaml: bool) -> Result<Self> {
        if yaml {
            serde_yaml::from_str(content).context("invalid YAML build description")
        } else {
            serde_json::from_str(content).context("invalid JSON build description")
        }
    }

    /// Load a description from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading build description: {}", path.display()))?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        Self::parse(&content, yaml).with_context(|| format!("parsing {}", path.display()))
    }
}
