// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Hosts File Rewriting
//!
//! `rewrite` runs on every boot, so it must converge: one mapping line for
//! the primary address, at most one loopback line, everything else kept.

use cim_hostname::provision::hosts::{lines_for, rewrite, LOOPBACK_ADDRESS, LOOPBACK_LINE};
use cim_hostname::Hostname;
use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr};

// ============================================================================
// Strategies
// ============================================================================

fn hosts_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("# managed by provisioning".to_string()),
        Just(String::new()),
        "[a-z]{1,8}".prop_map(|name| format!("127.0.0.1 {name}")),
        (0u8..=255).prop_map(|octet| format!("10.0.0.{octet} host{octet}")),
        "[a-z]{1,8}".prop_map(|name| format!("::1 {name}")),
    ]
}

fn hosts_content() -> impl Strategy<Value = String> {
    (prop::collection::vec(hosts_line(), 0..12), any::<bool>()).prop_map(|(lines, newline)| {
        let mut content = lines.join("\n");
        if newline && !content.is_empty() {
            content.push('\n');
        }
        content
    })
}

fn address() -> impl Strategy<Value = IpAddr> {
    (0u8..=255).prop_map(|octet| IpAddr::V4(Ipv4Addr::new(10, 0, 0, octet)))
}

fn hostname() -> impl Strategy<Value = Hostname> {
    "[a-z][a-z0-9-]{0,20}[a-z0-9]".prop_map(|name| Hostname::new(name).unwrap())
}

fn maps(line: &str, address: &str) -> bool {
    line.split_whitespace().next() == Some(address)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Rewriting an already rewritten file changes nothing
    #[test]
    fn prop_rewrite_is_idempotent(
        content in hosts_content(),
        address in address(),
        hostname in hostname(),
    ) {
        let once = rewrite(&content, address, &hostname);
        let twice = rewrite(&once, address, &hostname);

        prop_assert_eq!(once, twice);
    }

    /// Exactly one line maps the primary address, and it is the last line
    #[test]
    fn prop_single_mapping_line(
        content in hosts_content(),
        address in address(),
        hostname in hostname(),
    ) {
        let rewritten = rewrite(&content, address, &hostname);
        let expected = format!("{} {}", address, hostname);

        prop_assert_eq!(lines_for(&rewritten, address), vec![expected.as_str()]);
        prop_assert_eq!(rewritten.lines().last(), Some(expected.as_str()));
        prop_assert!(rewritten.ends_with('\n'));
    }

    /// At most one loopback line survives and it is canonical
    #[test]
    fn prop_loopback_canonical(
        content in hosts_content(),
        address in address(),
        hostname in hostname(),
    ) {
        let had_loopback = content.lines().any(|line| maps(line, LOOPBACK_ADDRESS));
        let rewritten = rewrite(&content, address, &hostname);
        let loopback: Vec<&str> = rewritten
            .lines()
            .filter(|line| maps(line, LOOPBACK_ADDRESS))
            .collect();

        if had_loopback {
            prop_assert_eq!(loopback, vec![LOOPBACK_LINE]);
        } else {
            prop_assert!(loopback.is_empty());
        }
    }

    /// Unrelated lines keep their content and order
    #[test]
    fn prop_unrelated_lines_preserved(
        content in hosts_content(),
        address in address(),
        hostname in hostname(),
    ) {
        let address_text = address.to_string();
        let unrelated = |text: &str| -> Vec<String> {
            text.lines()
                .filter(|line| !maps(line, &address_text) && !maps(line, LOOPBACK_ADDRESS))
                .map(str::to_string)
                .collect()
        };

        let rewritten = rewrite(&content, address, &hostname);

        prop_assert_eq!(unrelated(&rewritten), unrelated(&content));
    }
}
