// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instance Tag Set

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag key marking autoscaling group membership
pub const AUTOSCALING_GROUP_KEY: &str = "aws:autoscaling:groupName";

/// Tag key holding the instance name
pub const NAME_KEY: &str = "Name";

/// Tag key holding the deployment environment
pub const ENVIRONMENT_KEY: &str = "Environment";

/// Tag key holding the instance role
pub const ROLE_KEY: &str = "Role";

/// Snapshot of the key/value tags attached to an instance
///
/// Keys are unique; insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(HashMap<String, String>);

impl TagSet {
    /// Create an empty tag set
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether `key` is present, regardless of its value
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or overwrite a tag
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Fleet membership is decided by the autoscaling key alone
    pub fn is_fleet_member(&self) -> bool {
        self.contains(AUTOSCALING_GROUP_KEY)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for TagSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
