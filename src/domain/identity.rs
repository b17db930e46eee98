// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instance Identity Value Object

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use crate::errors::IdentityError;

/// Identity of the instance this process runs on
///
/// Resolved once per run from the identity source and never mutated.
/// Invariants:
/// - `id` and `region` are non-empty
/// - `primary_address` is a parsed IP address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceIdentity {
    id: String,
    region: String,
    primary_address: IpAddr,
}

impl InstanceIdentity {
    /// Build an identity from raw metadata values
    pub fn new(
        id: impl Into<String>,
        region: impl Into<String>,
        primary_address: impl AsRef<str>,
    ) -> Result<Self, IdentityError> {
        let id = id.into().trim().to_string();
        let region = region.into().trim().to_string();
        let address = primary_address.as_ref().trim();

        if id.is_empty() {
            return Err(IdentityError::MissingField("instance-id"));
        }
        if region.is_empty() {
            return Err(IdentityError::MissingField("region"));
        }
        if address.is_empty() {
            return Err(IdentityError::MissingField("local-ipv4"));
        }

        let primary_address = address
            .parse::<IpAddr>()
            .map_err(|_| IdentityError::InvalidAddress(address.to_string()))?;

        Ok(Self {
            id,
            region,
            primary_address,
        })
    }

    /// Instance id, e.g. `i-0abc123`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full region identifier, e.g. `us-east-1`
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Primary private address
    pub fn primary_address(&self) -> IpAddr {
        self.primary_address
    }
}

impl fmt::Display for InstanceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.id, self.region, self.primary_address)
    }
}
