// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hostname Provisioner
//!
//! Runs once at boot: resolves the instance identity from IMDS, reads the
//! instance's EC2 tags, derives the canonical hostname, applies it to the
//! host and, for autoscaling fleet members, writes it back as the Name tag.
//!
//! Run with: cargo run --bin cim-hostname -- --dry-run
//!
//! Every flag can also be set through its `CIM_HOSTNAME_*` environment
//! variable. Exits non-zero on any failure.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use cim_hostname::adapters::{Ec2TagStore, ImdsClient, ImdsConfig};
use cim_hostname::provision::{DryRunHost, HostSystem, LocalHost, ProvisionPaths};
use cim_hostname::{
    DegradedPolicy, HostnamePolicy, HostnameService, ProvisionerConfig, Provisioner, RunReport,
};

/// Provision a deterministic hostname for this cloud instance
#[derive(Debug, Parser)]
#[command(name = "cim-hostname", version, about)]
struct Cli {
    /// Instance metadata service base URL
    #[arg(long, env = "CIM_HOSTNAME_IMDS_ENDPOINT", default_value = "http://169.254.169.254")]
    imds_endpoint: String,

    /// Metadata request timeout in seconds
    #[arg(long, env = "CIM_HOSTNAME_IMDS_TIMEOUT_SECS", default_value_t = 2)]
    imds_timeout_secs: u64,

    /// Host-resolution file to update
    #[arg(long, env = "CIM_HOSTNAME_HOSTS_FILE", default_value = "/etc/hosts")]
    hosts_file: PathBuf,

    /// Cloud-init drop-in receiving the preserve_hostname flag
    #[arg(
        long,
        env = "CIM_HOSTNAME_CLOUD_CFG",
        default_value = "/etc/cloud/cloud.cfg.d/09_hostname.cfg"
    )]
    cloud_cfg: PathBuf,

    /// TOML file replacing the built-in region code table
    #[arg(long, env = "CIM_HOSTNAME_REGION_TABLE")]
    region_table: Option<PathBuf>,

    /// Apply hostnames with missing tags or unknown regions instead of failing
    #[arg(long, env = "CIM_HOSTNAME_ALLOW_DEGRADED")]
    allow_degraded: bool,

    /// Log host changes without applying them; never writes tags
    #[arg(long, env = "CIM_HOSTNAME_DRY_RUN")]
    dry_run: bool,

    /// Never write the Name tag back, even for fleet members
    #[arg(long, env = "CIM_HOSTNAME_SKIP_TAG_WRITE")]
    skip_tag_write: bool,
}

impl Cli {
    fn into_config(self) -> ProvisionerConfig {
        ProvisionerConfig {
            imds: ImdsConfig {
                endpoint: self.imds_endpoint,
                timeout_secs: self.imds_timeout_secs,
                ..Default::default()
            },
            paths: ProvisionPaths {
                hosts_file: self.hosts_file,
                cloud_cfg: self.cloud_cfg,
            },
            region_table: self.region_table,
            degraded_policy: if self.allow_degraded {
                DegradedPolicy::Proceed
            } else {
                DegradedPolicy::Reject
            },
            dry_run: self.dry_run,
            skip_tag_write: self.skip_tag_write,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Cli::parse().into_config();

    match run(config).await {
        Ok(report) => {
            info!(
                "Hostname {} provisioned (fleet managed: {}, Name tag written: {})",
                report.hostname, report.fleet_managed, report.tag_written
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Hostname provisioning failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ProvisionerConfig) -> Result<RunReport> {
    info!("Starting hostname provisioning");
    if config.dry_run {
        info!("Dry run: host changes are logged, not applied");
        execute(&config, DryRunHost::new(LocalHost::new())).await
    } else {
        execute(&config, LocalHost::new()).await
    }
}

async fn execute<H: HostSystem>(config: &ProvisionerConfig, host: H) -> Result<RunReport> {
    let regions = config.regions().context("Failed to load region table")?;
    let identity = ImdsClient::new(config.imds.clone()).context("Failed to create IMDS client")?;
    let tags = Ec2TagStore::from_env().await;

    let mut service = HostnameService::new(
        identity,
        tags,
        HostnamePolicy::new(regions),
        Provisioner::new(host, config.paths.clone()),
        config.service_options(),
    );

    Ok(service.run().await?)
}
