// Copyright (c) 2025 - Cowboy AI, Inc.
//! Region Code Table
//!
//! Closed mapping from full region identifiers to the short codes used in
//! fleet hostnames. The table is a value handed to the hostname policy, so
//! tests and deployments can supply their own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::ConfigError;

/// Result of a region lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionCode {
    /// Region is in the table
    Known(String),
    /// Region is not in the table
    Unknown,
}

impl RegionCode {
    /// Short code, or an empty fragment for unknown regions
    pub fn fragment(&self) -> &str {
        match self {
            RegionCode::Known(code) => code,
            RegionCode::Unknown => "",
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, RegionCode::Known(_))
    }
}

/// Immutable region → short code table
///
/// # Examples
///
/// ```rust
/// use cim_hostname::domain::{RegionCode, RegionTable};
///
/// let regions = RegionTable::default();
/// assert_eq!(regions.lookup("us-west-2"), RegionCode::Known("usw2".to_string()));
/// assert_eq!(regions.lookup("eu-west-1"), RegionCode::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTable {
    regions: BTreeMap<String, String>,
}

impl RegionTable {
    /// Build a table from `(region, code)` pairs
    pub fn new<I, R, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (R, C)>,
        R: Into<String>,
        C: Into<String>,
    {
        Self {
            regions: entries
                .into_iter()
                .map(|(region, code)| (region.into(), code.into()))
                .collect(),
        }
    }

    /// Parse a TOML document with a `[regions]` table
    ///
    /// ```toml
    /// [regions]
    /// us-east-1 = "use1"
    /// eu-west-1 = "euw1"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let table: RegionTable = toml::from_str(source)?;

        if let Some((region, _)) = table.regions.iter().find(|(_, code)| code.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "region {} has an empty short code",
                region
            )));
        }

        Ok(table)
    }

    /// Load a TOML region table from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Look up the short code for a region
    pub fn lookup(&self, region: &str) -> RegionCode {
        self.regions
            .get(region)
            .map(|code| RegionCode::Known(code.clone()))
            .unwrap_or(RegionCode::Unknown)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new([
            ("us-east-1", "use1"),
            ("us-east-2", "use2"),
            ("us-west-1", "usw1"),
            ("us-west-2", "usw2"),
        ])
    }
}
