// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory doubles for the pipeline's collaborators
//!
//! `StaticIdentity`, `MemoryTagStore` and `RecordingHost` satisfy the
//! adapter and host traits without network access or root privileges.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::adapters::{IdentitySource, TagStore};
use crate::domain::{Hostname, InstanceIdentity, TagSet, NAME_KEY};
use crate::errors::{IdentityError, IdentityResult, TagError, TagResult};
use crate::provision::{HostError, HostMutation, HostSystem};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// StaticIdentity
// ---------------------------------------------------------------------------

/// Identity source returning a fixed result
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    result: IdentityResult<InstanceIdentity>,
}

impl StaticIdentity {
    pub fn new(identity: InstanceIdentity) -> Self {
        Self {
            result: Ok(identity),
        }
    }

    pub fn failing(error: IdentityError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl IdentitySource for StaticIdentity {
    async fn resolve(&self) -> IdentityResult<InstanceIdentity> {
        self.result.clone()
    }
}

// ---------------------------------------------------------------------------
// MemoryTagStore
// ---------------------------------------------------------------------------

/// Tag store backed by a `HashMap<instance id, TagSet>`
#[derive(Debug, Default)]
pub struct MemoryTagStore {
    instances: Mutex<HashMap<String, TagSet>>,
    name_writes: Mutex<Vec<(String, String)>>,
    write_error: Mutex<Option<TagError>>,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance with its tags
    pub fn with_instance(self, id: impl Into<String>, tags: TagSet) -> Self {
        lock(&self.instances).insert(id.into(), tags);
        self
    }

    /// Make every subsequent Name tag write fail with `error`
    pub fn fail_writes(&self, error: TagError) {
        *lock(&self.write_error) = Some(error);
    }

    /// `(instance id, hostname)` for every Name tag write, in order
    pub fn name_writes(&self) -> Vec<(String, String)> {
        lock(&self.name_writes).clone()
    }

    /// Current tags of an instance
    pub fn tags(&self, id: &str) -> Option<TagSet> {
        lock(&self.instances).get(id).cloned()
    }
}

#[async_trait]
impl TagStore for MemoryTagStore {
    async fn read_tags(&self, identity: &InstanceIdentity) -> TagResult<TagSet> {
        lock(&self.instances)
            .get(identity.id())
            .cloned()
            .ok_or_else(|| TagError::NotFound(identity.id().to_string()))
    }

    async fn write_name_tag(
        &self,
        identity: &InstanceIdentity,
        hostname: &Hostname,
    ) -> TagResult<()> {
        if let Some(error) = lock(&self.write_error).clone() {
            return Err(error);
        }

        let mut instances = lock(&self.instances);
        let tags = instances
            .get_mut(identity.id())
            .ok_or_else(|| TagError::NotFound(identity.id().to_string()))?;
        tags.insert(NAME_KEY, hostname.as_str());

        lock(&self.name_writes).push((identity.id().to_string(), hostname.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingHost
// ---------------------------------------------------------------------------

/// Host double keeping files and hostname in memory
///
/// Every applied mutation is recorded. Failures can be injected per
/// hostname change or per file path; failed mutations are not recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    files: HashMap<PathBuf, String>,
    hostname: Option<Hostname>,
    mutations: Vec<HostMutation>,
    hostname_failure: Option<String>,
    failing_paths: HashSet<PathBuf>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a file without recording a mutation
    pub fn seed_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Make hostname changes fail with `reason`
    pub fn fail_set_hostname(&mut self, reason: impl Into<String>) {
        self.hostname_failure = Some(reason.into());
    }

    /// Make reads and writes of `path` fail
    pub fn fail_writes_to(&mut self, path: impl Into<PathBuf>) {
        self.failing_paths.insert(path.into());
    }

    pub fn mutations(&self) -> &[HostMutation] {
        &self.mutations
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn hostname(&self) -> Option<&Hostname> {
        self.hostname.as_ref()
    }
}

#[async_trait]
impl HostSystem for RecordingHost {
    async fn read_file(&self, path: &Path) -> Result<Option<String>, HostError> {
        if self.failing_paths.contains(path) {
            return Err(HostError::Refused(format!("read of {}", path.display())));
        }
        Ok(self.files.get(path).cloned())
    }

    async fn apply(&mut self, mutation: HostMutation) -> Result<(), HostError> {
        match &mutation {
            HostMutation::SetHostname(hostname) => {
                if let Some(reason) = &self.hostname_failure {
                    return Err(HostError::Refused(reason.clone()));
                }
                self.hostname = Some(hostname.clone());
            }
            HostMutation::WriteFile { path, contents } => {
                if self.failing_paths.contains(path) {
                    return Err(HostError::Refused(format!("write to {}", path.display())));
                }
                self.files.insert(path.clone(), contents.clone());
            }
        }
        self.mutations.push(mutation);
        Ok(())
    }
}
