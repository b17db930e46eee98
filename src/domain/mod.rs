// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Domain Models
//!
//! Value objects the hostname pipeline passes between its stages.
//!
//! - [`Hostname`] - DNS-validated hostname (RFC 1123)
//! - [`InstanceIdentity`] - instance id, region and primary address
//! - [`TagSet`] - snapshot of the instance's resource tags
//! - [`RegionTable`] - injected region → short code mapping

pub mod hostname;
pub mod identity;
pub mod region;
pub mod tags;

pub use hostname::{Hostname, HostnameError};
pub use identity::InstanceIdentity;
pub use region::{RegionCode, RegionTable};
pub use tags::{
    TagSet, AUTOSCALING_GROUP_KEY, ENVIRONMENT_KEY, NAME_KEY, ROLE_KEY,
};
