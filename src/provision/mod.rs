// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioner
//!
//! Applies an accepted hostname decision to the host as an ordered list of
//! idempotent steps:
//!
//! 1. `set-hostname` - live transient and static hostname
//! 2. `hosts-file`   - map the primary address to the hostname, canonical loopback line
//! 3. `boot-flag`    - cloud-init drop-in that stops hostname overwrites on reboot
//!
//! # Failure Semantics
//!
//! `set-hostname` is critical: if it fails no further step runs. The other
//! steps run regardless of each other's outcome and every outcome is
//! recorded in a [`ProvisionReport`]. Nothing is rolled back; each step is
//! safe to re-run.

pub mod hosts;
pub mod system;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::InstanceIdentity;
use crate::policy::AcceptedDecision;

pub use system::{DryRunHost, HostError, HostMutation, HostSystem, LocalHost};

/// Contents of the cloud-init drop-in
pub const PRESERVE_HOSTNAME: &str = "preserve_hostname: true\n";

/// File locations touched by the provisioner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionPaths {
    /// Host-resolution file
    pub hosts_file: PathBuf,
    /// Cloud-init drop-in holding the boot flag
    pub cloud_cfg: PathBuf,
}

impl Default for ProvisionPaths {
    fn default() -> Self {
        Self {
            hosts_file: PathBuf::from("/etc/hosts"),
            cloud_cfg: PathBuf::from("/etc/cloud/cloud.cfg.d/09_hostname.cfg"),
        }
    }
}

/// Provisioning steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionStep {
    SetHostname,
    HostsFile,
    BootFlag,
}

impl ProvisionStep {
    pub const ALL: [ProvisionStep; 3] = [
        ProvisionStep::SetHostname,
        ProvisionStep::HostsFile,
        ProvisionStep::BootFlag,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProvisionStep::SetHostname => "set-hostname",
            ProvisionStep::HostsFile => "hosts-file",
            ProvisionStep::BootFlag => "boot-flag",
        }
    }

    /// Later steps are skipped when a critical step fails
    pub fn is_critical(&self) -> bool {
        matches!(self, ProvisionStep::SetHostname)
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Applied,
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: ProvisionStep,
    pub status: StepStatus,
}

/// Outcomes of every step of one provisioning run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionReport {
    pub outcomes: Vec<StepOutcome>,
}

impl ProvisionReport {
    fn record(&mut self, step: ProvisionStep, status: StepStatus) {
        self.outcomes.push(StepOutcome { step, status });
    }

    pub fn status(&self, step: ProvisionStep) -> Option<&StepStatus> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.step == step)
            .map(|outcome| &outcome.status)
    }

    /// Steps that failed, with their error messages
    pub fn failures(&self) -> Vec<(ProvisionStep, &str)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.status {
                StepStatus::Failed(reason) => Some((outcome.step, reason.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Every step applied
    pub fn is_complete(&self) -> bool {
        self.outcomes.len() == ProvisionStep::ALL.len()
            && self
                .outcomes
                .iter()
                .all(|outcome| outcome.status == StepStatus::Applied)
    }
}

impl fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match &outcome.status {
                StepStatus::Applied => write!(f, "{}: applied", outcome.step)?,
                StepStatus::Failed(reason) => write!(f, "{}: failed ({})", outcome.step, reason)?,
                StepStatus::Skipped => write!(f, "{}: skipped", outcome.step)?,
            }
        }
        Ok(())
    }
}

/// Provisioning errors
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A critical step failed; later steps were skipped
    #[error("Provisioning aborted at {step}: {source}")]
    Aborted {
        step: ProvisionStep,
        #[source]
        source: HostError,
        report: ProvisionReport,
    },

    /// Hostname set but at least one later step failed
    #[error("Provisioning incomplete: {0}")]
    Incomplete(ProvisionReport),
}

impl ProvisionError {
    pub fn report(&self) -> &ProvisionReport {
        match self {
            ProvisionError::Aborted { report, .. } => report,
            ProvisionError::Incomplete(report) => report,
        }
    }
}

/// Applies hostname decisions through a [`HostSystem`]
pub struct Provisioner<H> {
    host: H,
    paths: ProvisionPaths,
}

impl<H: HostSystem> Provisioner<H> {
    pub fn new(host: H, paths: ProvisionPaths) -> Self {
        Self { host, paths }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn paths(&self) -> &ProvisionPaths {
        &self.paths
    }

    /// Apply `decision` for `identity`
    pub async fn apply(
        &mut self,
        decision: &AcceptedDecision,
        identity: &InstanceIdentity,
    ) -> Result<ProvisionReport, ProvisionError> {
        let mut report = ProvisionReport::default();
        let mut aborted: Option<(ProvisionStep, HostError)> = None;

        for step in ProvisionStep::ALL {
            if aborted.is_some() {
                report.record(step, StepStatus::Skipped);
                continue;
            }

            match self.run_step(step, decision, identity).await {
                Ok(()) => report.record(step, StepStatus::Applied),
                Err(e) => {
                    warn!("Provisioning step {} failed: {}", step, e);
                    report.record(step, StepStatus::Failed(e.to_string()));
                    if step.is_critical() {
                        aborted = Some((step, e));
                    }
                }
            }
        }

        if let Some((step, source)) = aborted {
            return Err(ProvisionError::Aborted {
                step,
                source,
                report,
            });
        }

        if report.is_complete() {
            Ok(report)
        } else {
            Err(ProvisionError::Incomplete(report))
        }
    }

    async fn run_step(
        &mut self,
        step: ProvisionStep,
        decision: &AcceptedDecision,
        identity: &InstanceIdentity,
    ) -> Result<(), HostError> {
        match step {
            ProvisionStep::SetHostname => {
                info!("Setting hostname to {}", decision.hostname());
                self.host
                    .apply(HostMutation::SetHostname(decision.hostname().clone()))
                    .await
            }
            ProvisionStep::HostsFile => {
                info!(
                    "Mapping {} to {} in {}",
                    identity.primary_address(),
                    decision.hostname(),
                    self.paths.hosts_file.display()
                );
                self.update_hosts_file(decision, identity).await
            }
            ProvisionStep::BootFlag => {
                info!("Writing boot flag to {}", self.paths.cloud_cfg.display());
                self.write_boot_flag().await
            }
        }
    }

    async fn update_hosts_file(
        &mut self,
        decision: &AcceptedDecision,
        identity: &InstanceIdentity,
    ) -> Result<(), HostError> {
        let path = self.paths.hosts_file.clone();
        let current = self.host.read_file(&path).await?.unwrap_or_default();
        for stale in hosts::lines_for(&current, identity.primary_address()) {
            debug!("Replacing hosts entry {:?}", stale);
        }
        let contents = hosts::rewrite(&current, identity.primary_address(), decision.hostname());

        self.host
            .apply(HostMutation::WriteFile { path, contents })
            .await
    }

    async fn write_boot_flag(&mut self) -> Result<(), HostError> {
        self.host
            .apply(HostMutation::WriteFile {
                path: self.paths.cloud_cfg.clone(),
                contents: PRESERVE_HOSTNAME.to_string(),
            })
            .await
    }
}
