// Copyright (c) 2025 - Cowboy AI, Inc.

//! Provisioner configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::adapters::ImdsConfig;
use crate::domain::RegionTable;
use crate::errors::ConfigError;
use crate::policy::DegradedPolicy;
use crate::provision::ProvisionPaths;
use crate::service::ServiceOptions;

/// Everything a provisioning run can be told
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionerConfig {
    /// Metadata endpoint settings
    #[serde(default)]
    pub imds: ImdsConfig,

    /// Files touched on the host
    #[serde(default)]
    pub paths: ProvisionPaths,

    /// TOML file replacing the built-in region table
    pub region_table: Option<PathBuf>,

    /// Treatment of degraded hostname decisions
    #[serde(default)]
    pub degraded_policy: DegradedPolicy,

    /// Log host mutations instead of applying them; implies `skip_tag_write`
    #[serde(default)]
    pub dry_run: bool,

    /// Never write the Name tag back
    #[serde(default)]
    pub skip_tag_write: bool,
}

impl ProvisionerConfig {
    /// Region table to inject into the hostname policy
    pub fn regions(&self) -> Result<RegionTable, ConfigError> {
        match &self.region_table {
            Some(path) => RegionTable::load(path),
            None => Ok(RegionTable::default()),
        }
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            degraded_policy: self.degraded_policy,
            skip_tag_write: self.skip_tag_write || self.dry_run,
        }
    }
}
