// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hostname Provisioning Service
//!
//! Runs the provisioning pipeline once, strictly in order:
//!
//! ```text
//! IdentitySource ──> TagStore.read ──> HostnamePolicy ──> Provisioner
//!                                                            │
//!                                   fleet-managed only       ▼
//!                                   TagStore.write_name_tag (Name = hostname)
//! ```
//!
//! Every error ends the run. Once the hostname itself is set, fleet
//! instances get their Name tag written even if a later provisioning step
//! failed, so the tag never lags behind the live hostname. A failed write
//! leaves the OS hostname in place.

use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

use crate::adapters::{IdentitySource, TagStore};
use crate::domain::{Hostname, InstanceIdentity};
use crate::errors::{IdentityError, TagError};
use crate::policy::{AcceptedDecision, DegradedPolicy, HostnamePolicy, PolicyError};
use crate::provision::{HostSystem, ProvisionError, ProvisionReport, Provisioner};

/// Service layer result type
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service layer errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Instance identity could not be resolved
    #[error("Identity resolution failed: {0}")]
    Identity(#[from] IdentityError),

    /// Instance tags could not be read
    #[error("Tag read failed: {0}")]
    TagRead(#[source] TagError),

    /// Hostname decision not acceptable
    #[error("Hostname decision rejected: {0}")]
    Policy(#[from] PolicyError),

    /// OS provisioning failed
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// Hostname set, but a later provisioning step failed
    #[error("Provisioning incomplete for {hostname}: {report}; Name tag {tag}")]
    Incomplete {
        hostname: Hostname,
        report: ProvisionReport,
        tag: TagWriteOutcome,
    },

    /// Host provisioned, but the Name tag could not be written
    #[error("Hostname {hostname} applied but Name tag write-back failed: {source}")]
    TagWriteBack {
        hostname: Hostname,
        #[source]
        source: TagError,
    },
}

/// What happened to the Name tag write-back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagWriteOutcome {
    Written,
    /// Not fleet managed, or write-back disabled
    Skipped,
    Failed(TagError),
}

impl fmt::Display for TagWriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagWriteOutcome::Written => f.write_str("written"),
            TagWriteOutcome::Skipped => f.write_str("skipped"),
            TagWriteOutcome::Failed(e) => write!(f, "failed ({})", e),
        }
    }
}

/// Run-wide options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Treatment of degraded hostname decisions
    pub degraded_policy: DegradedPolicy,
    /// Never write the Name tag back
    pub skip_tag_write: bool,
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub identity: InstanceIdentity,
    pub hostname: Hostname,
    pub fleet_managed: bool,
    pub provision: ProvisionReport,
    pub tag_written: bool,
}

/// Hostname provisioning pipeline
pub struct HostnameService<I, T, H> {
    identity: I,
    tags: T,
    policy: HostnamePolicy,
    provisioner: Provisioner<H>,
    options: ServiceOptions,
}

impl<I, T, H> HostnameService<I, T, H>
where
    I: IdentitySource,
    T: TagStore,
    H: HostSystem,
{
    pub fn new(
        identity: I,
        tags: T,
        policy: HostnamePolicy,
        provisioner: Provisioner<H>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            identity,
            tags,
            policy,
            provisioner,
            options,
        }
    }

    pub fn tag_store(&self) -> &T {
        &self.tags
    }

    pub fn provisioner(&self) -> &Provisioner<H> {
        &self.provisioner
    }

    /// Run the pipeline once
    pub async fn run(&mut self) -> ServiceResult<RunReport> {
        let identity = self.identity.resolve().await?;

        let tags = self
            .tags
            .read_tags(&identity)
            .await
            .map_err(ServiceError::TagRead)?;
        info!("Read {} tags for {}", tags.len(), identity.id());

        let decision = self.policy.decide(&identity, &tags);
        info!(
            fleet_managed = decision.fleet_managed,
            "Derived hostname {:?}", decision.hostname
        );
        let decision = decision.accept(self.options.degraded_policy)?;

        // Only an aborted run (hostname not set) skips the write-back
        let provision = match self.provisioner.apply(&decision, &identity).await {
            Ok(report) => {
                info!("Provisioned {}: {}", decision.hostname(), report);
                Ok(report)
            }
            Err(ProvisionError::Incomplete(report)) => {
                warn!("Provisioned {} with failures: {}", decision.hostname(), report);
                Err(report)
            }
            Err(e) => return Err(e.into()),
        };

        let tag = self.write_back(&decision, &identity).await;

        match (provision, tag) {
            (Err(report), tag) => Err(ServiceError::Incomplete {
                hostname: decision.hostname().clone(),
                report,
                tag,
            }),
            (Ok(_), TagWriteOutcome::Failed(source)) => Err(ServiceError::TagWriteBack {
                hostname: decision.hostname().clone(),
                source,
            }),
            (Ok(provision), tag) => Ok(RunReport {
                identity,
                hostname: decision.hostname().clone(),
                fleet_managed: decision.fleet_managed(),
                provision,
                tag_written: tag == TagWriteOutcome::Written,
            }),
        }
    }

    async fn write_back(
        &self,
        decision: &AcceptedDecision,
        identity: &InstanceIdentity,
    ) -> TagWriteOutcome {
        if !decision.fleet_managed() || self.options.skip_tag_write {
            return TagWriteOutcome::Skipped;
        }

        info!("Writing Name tag {} to {}", decision.hostname(), identity.id());
        match self.tags.write_name_tag(identity, decision.hostname()).await {
            Ok(()) => TagWriteOutcome::Written,
            Err(e) => {
                error!(
                    "Name tag write failed; OS hostname {} stays applied",
                    decision.hostname()
                );
                TagWriteOutcome::Failed(e)
            }
        }
    }
}
