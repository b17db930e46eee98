// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deterministic boot-time hostname provisioning for cloud compute instances
//!
//! Derives a canonical hostname from an instance's identity and tags,
//! applies it to the OS (live hostname, `/etc/hosts`, cloud-init boot flag)
//! and, for autoscaling fleet members, writes it back as the `Name` tag.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fakes;
pub mod policy;
pub mod provision;
pub mod service;

// Re-export commonly used types
pub use config::ProvisionerConfig;
pub use domain::{Hostname, InstanceIdentity, RegionTable, TagSet};
pub use errors::{ConfigError, IdentityError, TagError};
pub use policy::{AcceptedDecision, DegradedPolicy, HostnameDecision, HostnamePolicy, PolicyError};
pub use provision::{ProvisionError, ProvisionReport, Provisioner};
pub use service::{HostnameService, RunReport, ServiceError, ServiceOptions, TagWriteOutcome};
