// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hostname Policy
//!
//! Decides the canonical hostname for an instance from its identity and
//! tags. Deciding is pure: no I/O, no logging, deterministic for a given
//! identity, tag set and region table.
//!
//! # Rules
//!
//! ```text
//! fleet member (aws:autoscaling:groupName present):
//!     {Environment}-aws-{RegionCode}-{Role with _ → -}-{instance id without "i-"}
//!
//! standalone:
//!     {Name}
//! ```
//!
//! Missing tags and unknown regions do not stop [`HostnamePolicy::decide`];
//! they are recorded as [`Degradation`]s and judged afterwards by
//! [`HostnameDecision::accept`] under an explicit [`DegradedPolicy`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::domain::{
    Hostname, HostnameError, InstanceIdentity, RegionCode, RegionTable, TagSet,
    ENVIRONMENT_KEY, NAME_KEY, ROLE_KEY,
};

/// What to do with a decision that has degradations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedPolicy {
    /// Fail the run
    #[default]
    Reject,
    /// Log each degradation and apply the incomplete hostname
    Proceed,
}

/// A condition that left a fragment of the hostname empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degradation {
    /// Required tag absent or empty
    MissingTag(String),
    /// Region not present in the region table
    UnknownRegion(String),
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::MissingTag(key) => write!(f, "tag {} is missing", key),
            Degradation::UnknownRegion(region) => write!(f, "region {} has no short code", region),
        }
    }
}

struct Degradations<'a>(&'a [Degradation]);

impl fmt::Display for Degradations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, degradation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", degradation)?;
        }
        Ok(())
    }
}

/// Errors accepting a hostname decision
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// No hostname could be derived at all
    #[error("No hostname could be derived ({})", Degradations(.degradations))]
    EmptyHostname { degradations: Vec<Degradation> },

    /// Hostname derived with degradations under the reject policy
    #[error("Hostname {hostname:?} is incomplete: {}", Degradations(.degradations))]
    Degraded {
        hostname: String,
        degradations: Vec<Degradation>,
    },

    /// Derived hostname is not a valid DNS name
    #[error("Derived hostname {hostname:?} is invalid: {source}")]
    InvalidHostname {
        hostname: String,
        #[source]
        source: HostnameError,
    },
}

/// Output of [`HostnamePolicy::decide`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostnameDecision {
    /// Candidate hostname, possibly empty or incomplete
    pub hostname: String,
    /// Whether the Name tag must be written back
    pub fleet_managed: bool,
    /// Conditions that left fragments empty
    pub degradations: Vec<Degradation>,
}

impl HostnameDecision {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    /// Judge the decision under `policy`
    ///
    /// An empty hostname is rejected under every policy. Whatever passes
    /// must also be a valid DNS hostname.
    pub fn accept(self, policy: DegradedPolicy) -> Result<AcceptedDecision, PolicyError> {
        if self.hostname.is_empty() {
            return Err(PolicyError::EmptyHostname {
                degradations: self.degradations,
            });
        }

        if self.is_degraded() {
            match policy {
                DegradedPolicy::Reject => {
                    return Err(PolicyError::Degraded {
                        hostname: self.hostname,
                        degradations: self.degradations,
                    });
                }
                DegradedPolicy::Proceed => {
                    for degradation in &self.degradations {
                        warn!(hostname = %self.hostname, "Proceeding with degraded hostname: {}", degradation);
                    }
                }
            }
        }

        let hostname = Hostname::new(self.hostname.as_str()).map_err(|source| {
            PolicyError::InvalidHostname {
                hostname: self.hostname.clone(),
                source,
            }
        })?;

        Ok(AcceptedDecision {
            hostname,
            fleet_managed: self.fleet_managed,
        })
    }
}

/// A decision that may be handed to the provisioner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedDecision {
    hostname: Hostname,
    fleet_managed: bool,
}

impl AcceptedDecision {
    pub fn new(hostname: Hostname, fleet_managed: bool) -> Self {
        Self {
            hostname,
            fleet_managed,
        }
    }

    pub fn hostname(&self) -> &Hostname {
        &self.hostname
    }

    pub fn fleet_managed(&self) -> bool {
        self.fleet_managed
    }
}

/// Fragments of a fleet hostname, in positional order
///
/// ```rust
/// use cim_hostname::policy::FleetHostname;
///
/// let name = FleetHostname::parse("prod-aws-use1-web-app-0abc123").unwrap();
/// assert_eq!(name.environment, "prod");
/// assert_eq!(name.region_code, "use1");
/// assert_eq!(name.role, "web-app");
/// assert_eq!(name.instance, "0abc123");
/// assert_eq!(name.to_string(), "prod-aws-use1-web-app-0abc123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetHostname {
    pub environment: String,
    pub region_code: String,
    pub role: String,
    pub instance: String,
}

impl FleetHostname {
    /// Literal provider marker between environment and region code
    pub const PROVIDER: &'static str = "aws";

    /// Split a composed fleet hostname back into its fragments
    ///
    /// The environment ends at the first `-aws-`, the region code at the
    /// next hyphen, and the instance fragment starts after the last hyphen.
    /// The role keeps whatever hyphens lie between.
    pub fn parse(hostname: &str) -> Option<Self> {
        let (environment, rest) = hostname.split_once("-aws-")?;
        let (region_code, rest) = rest.split_once('-')?;
        let (role, instance) = rest.rsplit_once('-')?;

        Some(Self {
            environment: environment.to_string(),
            region_code: region_code.to_string(),
            role: role.to_string(),
            instance: instance.to_string(),
        })
    }
}

impl fmt::Display for FleetHostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            self.environment,
            Self::PROVIDER,
            self.region_code,
            self.role,
            self.instance
        )
    }
}

/// Replace every underscore with a hyphen
pub fn normalize_role(role: &str) -> String {
    role.replace('_', "-")
}

/// Strip the literal `i-` prefix from an instance id
///
/// Only the two-character prefix is removed once: `"ii-1"` is returned
/// unchanged and `"i-i-1"` becomes `"i-1"`.
pub fn trim_instance_id(id: &str) -> &str {
    id.strip_prefix("i-").unwrap_or(id)
}

/// Hostname policy with its injected region table
#[derive(Debug, Clone, Default)]
pub struct HostnamePolicy {
    regions: RegionTable,
}

impl HostnamePolicy {
    pub fn new(regions: RegionTable) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Decide the hostname for `identity` given its `tags`
    pub fn decide(&self, identity: &InstanceIdentity, tags: &TagSet) -> HostnameDecision {
        if tags.is_fleet_member() {
            self.decide_fleet(identity, tags)
        } else {
            Self::decide_standalone(tags)
        }
    }

    fn decide_fleet(&self, identity: &InstanceIdentity, tags: &TagSet) -> HostnameDecision {
        let mut degradations = Vec::new();

        let environment = required_tag(tags, ENVIRONMENT_KEY, &mut degradations);
        let role = required_tag(tags, ROLE_KEY, &mut degradations);

        let region_code = self.regions.lookup(identity.region());
        if let RegionCode::Unknown = region_code {
            degradations.push(Degradation::UnknownRegion(identity.region().to_string()));
        }

        let name = FleetHostname {
            environment: environment.to_string(),
            region_code: region_code.fragment().to_string(),
            role: normalize_role(role),
            instance: trim_instance_id(identity.id()).to_string(),
        };

        HostnameDecision {
            hostname: name.to_string(),
            fleet_managed: true,
            degradations,
        }
    }

    fn decide_standalone(tags: &TagSet) -> HostnameDecision {
        let mut degradations = Vec::new();
        let hostname = required_tag(tags, NAME_KEY, &mut degradations).to_string();

        HostnameDecision {
            hostname,
            fleet_managed: false,
            degradations,
        }
    }
}

fn required_tag<'a>(tags: &'a TagSet, key: &str, degradations: &mut Vec<Degradation>) -> &'a str {
    match tags.get(key) {
        Some(value) if !value.is_empty() => value,
        _ => {
            degradations.push(Degradation::MissingTag(key.to_string()));
            ""
        }
    }
}
