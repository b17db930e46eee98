// Copyright (c) 2025 - Cowboy AI, Inc.

//! Cloud provider adapters
//!
//! The pipeline talks to the hosting platform through two traits:
//!
//! - [`IdentitySource`] - who am I (instance id, region, primary address)
//! - [`TagStore`] - which tags does my instance resource carry
//!
//! Concrete implementations live in the submodules; in-memory doubles live
//! in [`crate::fakes`].

use async_trait::async_trait;

use crate::domain::{Hostname, InstanceIdentity, TagSet};
use crate::errors::{IdentityResult, TagResult};

pub mod imds;

#[cfg(feature = "aws")]
pub mod ec2;

pub use imds::{ImdsClient, ImdsConfig};

#[cfg(feature = "aws")]
pub use ec2::Ec2TagStore;

/// Source of the current instance's identity
///
/// Resolving must be free of side effects and safe to retry.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    async fn resolve(&self) -> IdentityResult<InstanceIdentity>;
}

/// Tag set attached to the instance resource
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Read every tag currently attached to the instance
    async fn read_tags(&self, identity: &InstanceIdentity) -> TagResult<TagSet>;

    /// Create or overwrite the `Name` tag
    async fn write_name_tag(
        &self,
        identity: &InstanceIdentity,
        hostname: &Hostname,
    ) -> TagResult<()>;
}
