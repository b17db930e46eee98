// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Hostname Policy
//!
//! The policy is a pure function of identity, tags and region table. These
//! properties pin down fleet membership, the positional hostname layout
//! and degradation handling.

use cim_hostname::domain::{AUTOSCALING_GROUP_KEY, ENVIRONMENT_KEY, NAME_KEY, ROLE_KEY};
use cim_hostname::policy::{normalize_role, trim_instance_id, Degradation, FleetHostname};
use cim_hostname::{
    DegradedPolicy, Hostname, HostnamePolicy, InstanceIdentity, PolicyError, TagSet,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn environment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,9}"
}

fn role() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,9}"
}

fn instance_id() -> impl Strategy<Value = String> {
    "i-[0-9a-f]{8,17}"
}

fn region() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("us-east-1"),
        Just("us-east-2"),
        Just("us-west-1"),
        Just("us-west-2"),
    ]
}

fn identity(id: &str, region: &str) -> InstanceIdentity {
    InstanceIdentity::new(id, region, "10.0.0.5").unwrap()
}

fn fleet_tags(environment: &str, role: &str) -> TagSet {
    [
        (AUTOSCALING_GROUP_KEY, "fleet-asg"),
        (ENVIRONMENT_KEY, environment),
        (ROLE_KEY, role),
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Fleet management is decided by the autoscaling tag alone
    #[test]
    fn prop_fleet_membership_iff_autoscaling_tag(
        in_fleet in any::<bool>(),
        name in "[a-z][a-z0-9-]{0,10}[a-z0-9]",
        environment in environment(),
        role in role(),
        id in instance_id(),
    ) {
        let mut tags: TagSet = [
            (NAME_KEY, name.as_str()),
            (ENVIRONMENT_KEY, environment.as_str()),
            (ROLE_KEY, role.as_str()),
        ]
        .into_iter()
        .collect();
        if in_fleet {
            tags.insert(AUTOSCALING_GROUP_KEY, "fleet-asg");
        }

        let decision = HostnamePolicy::default().decide(&identity(&id, "us-east-1"), &tags);

        prop_assert_eq!(decision.fleet_managed, in_fleet);
        if !in_fleet {
            prop_assert_eq!(decision.hostname, name);
        }
    }

    /// A complete fleet hostname splits back into the fragments it came from
    #[test]
    fn prop_fleet_hostname_fragments_roundtrip(
        environment in environment(),
        role in role(),
        id in instance_id(),
        region in region(),
    ) {
        let policy = HostnamePolicy::default();
        let decision = policy.decide(&identity(&id, region), &fleet_tags(&environment, &role));

        prop_assert!(!decision.is_degraded());

        let code = policy.regions().lookup(region);
        let parsed = FleetHostname::parse(&decision.hostname).unwrap();
        prop_assert_eq!(parsed.environment, environment);
        prop_assert_eq!(parsed.region_code, code.fragment());
        prop_assert_eq!(parsed.role, normalize_role(&role));
        prop_assert_eq!(parsed.instance, trim_instance_id(&id));
    }

    /// Complete fleet decisions are always accepted as valid hostnames
    #[test]
    fn prop_complete_fleet_decision_accepted(
        environment in environment(),
        role in role(),
        id in instance_id(),
        region in region(),
    ) {
        let decision = HostnamePolicy::default()
            .decide(&identity(&id, region), &fleet_tags(&environment, &role));
        let expected = decision.hostname.clone();

        let accepted = decision.accept(DegradedPolicy::Reject).unwrap();
        prop_assert_eq!(accepted.hostname().as_str(), expected.as_str());
        prop_assert!(accepted.fleet_managed());
    }

    /// Same inputs, same decision
    #[test]
    fn prop_decide_is_deterministic(
        environment in environment(),
        role in role(),
        id in instance_id(),
        region in region(),
    ) {
        let policy = HostnamePolicy::default();
        let identity = identity(&id, region);
        let tags = fleet_tags(&environment, &role);

        prop_assert_eq!(policy.decide(&identity, &tags), policy.decide(&identity, &tags));
    }

    /// Role normalisation only swaps underscores for hyphens
    #[test]
    fn prop_normalize_role_removes_underscores(role in "[A-Za-z0-9_-]{0,20}") {
        let normalized = normalize_role(&role);

        prop_assert!(!normalized.contains('_'));
        prop_assert_eq!(normalized.len(), role.len());
        prop_assert_eq!(normalize_role(&normalized), normalized.clone());
    }

    /// A missing environment is always reported and rejected by default
    #[test]
    fn prop_missing_environment_rejected(role in role(), id in instance_id()) {
        let tags: TagSet = [(AUTOSCALING_GROUP_KEY, "fleet-asg"), (ROLE_KEY, role.as_str())]
            .into_iter()
            .collect();

        let decision = HostnamePolicy::default().decide(&identity(&id, "us-east-1"), &tags);

        prop_assert!(decision
            .degradations
            .contains(&Degradation::MissingTag(ENVIRONMENT_KEY.to_string())));
        prop_assert!(
            matches!(
                decision.accept(DegradedPolicy::Reject),
                Err(PolicyError::Degraded { .. })
            ),
            "expected degraded rejection"
        );
    }

    /// Standalone instances take any valid Name tag verbatim
    #[test]
    fn prop_standalone_uses_name_verbatim(
        name in "[a-z][a-z0-9-]{0,20}[a-z0-9]",
        id in instance_id(),
    ) {
        let tags: TagSet = [(NAME_KEY, name.as_str())].into_iter().collect();
        let expected = Hostname::new(name.as_str()).unwrap();

        let accepted = HostnamePolicy::default()
            .decide(&identity(&id, "us-west-2"), &tags)
            .accept(DegradedPolicy::Reject)
            .unwrap();

        prop_assert_eq!(accepted.hostname(), &expected);
        prop_assert!(!accepted.fleet_managed());
    }
}
