// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties of the pure parts of the pipeline: the hostname policy and
//! the hosts file transform.

mod hostname_policy;
mod hosts_file;
