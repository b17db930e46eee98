// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host-resolution file rewriting
//!
//! Pure transform over the text of `/etc/hosts`. Applying it twice with
//! the same address and hostname yields the same text as applying it once.

use std::net::IpAddr;

use crate::domain::Hostname;

/// Address of the loopback line that gets canonicalised
pub const LOOPBACK_ADDRESS: &str = "127.0.0.1";

/// Canonical loopback line
pub const LOOPBACK_LINE: &str =
    "127.0.0.1 localhost localhost.localdomain localhost4 localhost4.localdomain4";

/// Rewrite hosts file `content` so `address` maps to `hostname`
///
/// - every line whose address field equals `address` is dropped and a
///   single `<address> <hostname>` line is appended
/// - the first `127.0.0.1` line is replaced by [`LOOPBACK_LINE`]; later
///   `127.0.0.1` lines are dropped
/// - all other lines, comments and blank lines keep their order
///
/// The address field is compared exactly, so `10.0.0.50` survives a
/// rewrite for `10.0.0.5`.
pub fn rewrite(content: &str, address: IpAddr, hostname: &Hostname) -> String {
    let address = address.to_string();
    let mapping = format!("{} {}", address, hostname);
    let mut lines: Vec<&str> = Vec::new();
    let mut loopback_seen = false;

    for line in content.lines() {
        match address_field(line) {
            Some(field) if field == address => {}
            Some(LOOPBACK_ADDRESS) => {
                if !loopback_seen {
                    lines.push(LOOPBACK_LINE);
                    loopback_seen = true;
                }
            }
            _ => lines.push(line),
        }
    }

    lines.push(&mapping);

    let mut rewritten = lines.join("\n");
    rewritten.push('\n');
    rewritten
}

/// Lines that map `address`
pub fn lines_for<'a>(content: &'a str, address: IpAddr) -> Vec<&'a str> {
    let address = address.to_string();
    content
        .lines()
        .filter(|line| address_field(line) == Some(address.as_str()))
        .collect()
}

fn address_field(line: &str) -> Option<&str> {
    let field = line.split_whitespace().next()?;
    if field.starts_with('#') {
        None
    } else {
        Some(field)
    }
}
