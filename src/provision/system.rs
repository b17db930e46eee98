// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host System Boundary
//!
//! The provisioner never touches the OS directly. It reads files and hands
//! [`HostMutation`]s to a [`HostSystem`], which decides how (or whether)
//! they are performed.
//!
//! ```text
//! Provisioner                     HostSystem
//! ───────────                     ──────────
//!
//! read_file(/etc/hosts) ───────>  LocalHost     (tokio::fs, hostnamectl)
//! apply(SetHostname)    ───────>  DryRunHost    (logs, never mutates)
//! apply(WriteFile)      ───────>  RecordingHost (in memory, for tests)
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::Hostname;

/// A single OS-level mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostMutation {
    /// Set the transient and static hostname
    SetHostname(Hostname),

    /// Replace a file's contents entirely
    WriteFile {
        /// Target path
        path: PathBuf,
        /// Full new contents
        contents: String,
    },
}

impl fmt::Display for HostMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostMutation::SetHostname(hostname) => write!(f, "set hostname to {}", hostname),
            HostMutation::WriteFile { path, contents } => {
                write!(f, "write {} bytes to {}", contents.len(), path.display())
            }
        }
    }
}

/// Errors performing OS-level mutations
#[derive(Debug, Error)]
pub enum HostError {
    /// File could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Command could not be started
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Command ran and exited unsuccessfully
    #[error("{command} exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    /// Mutation refused by the host implementation
    #[error("Mutation refused: {0}")]
    Refused(String),
}

/// OS primitives needed by the provisioner
#[async_trait]
pub trait HostSystem: Send + Sync {
    /// Read a text file, `None` if it does not exist
    async fn read_file(&self, path: &Path) -> Result<Option<String>, HostError>;

    /// Perform a mutation
    async fn apply(&mut self, mutation: HostMutation) -> Result<(), HostError>;
}

/// The machine this process runs on
#[derive(Debug, Clone)]
pub struct LocalHost {
    hostnamectl: PathBuf,
}

impl LocalHost {
    pub fn new() -> Self {
        Self {
            hostnamectl: PathBuf::from("hostnamectl"),
        }
    }

    /// Use a specific `hostnamectl` binary
    pub fn with_hostnamectl(mut self, path: impl Into<PathBuf>) -> Self {
        self.hostnamectl = path.into();
        self
    }

    async fn set_hostname(&self, hostname: &Hostname) -> Result<(), HostError> {
        let command = self.hostnamectl.display().to_string();
        debug!("Running {} set-hostname {}", command, hostname);

        let output = Command::new(&self.hostnamectl)
            .args([
                "--static",
                "--transient",
                "--no-ask-password",
                "set-hostname",
                hostname.as_str(),
            ])
            .output()
            .await
            .map_err(|source| HostError::Spawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(HostError::Command {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), HostError> {
        let io_err = |source| HostError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(path, contents).await.map_err(io_err)?;
        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostSystem for LocalHost {
    async fn read_file(&self, path: &Path) -> Result<Option<String>, HostError> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(HostError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    async fn apply(&mut self, mutation: HostMutation) -> Result<(), HostError> {
        match &mutation {
            HostMutation::SetHostname(hostname) => self.set_hostname(hostname).await,
            HostMutation::WriteFile { path, contents } => self.write_file(path, contents).await,
        }
    }
}

/// Dry-run host - reads through the wrapped host, logs mutations
///
/// Nothing is mutated. Planned mutations are kept for inspection.
#[derive(Debug, Clone)]
pub struct DryRunHost<H> {
    inner: H,
    planned: Vec<HostMutation>,
}

impl<H: HostSystem> DryRunHost<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            planned: Vec::new(),
        }
    }

    /// Mutations that would have been applied
    pub fn planned(&self) -> &[HostMutation] {
        &self.planned
    }
}

#[async_trait]
impl<H: HostSystem> HostSystem for DryRunHost<H> {
    async fn read_file(&self, path: &Path) -> Result<Option<String>, HostError> {
        self.inner.read_file(path).await
    }

    async fn apply(&mut self, mutation: HostMutation) -> Result<(), HostError> {
        info!("DRY RUN: would {}", mutation);
        if let HostMutation::WriteFile { path, contents } = &mutation {
            debug!("DRY RUN: {} contents:\n{}", path.display(), contents);
        }
        self.planned.push(mutation);
        Ok(())
    }
}
