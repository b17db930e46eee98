// Copyright (c) 2025 - Cowboy AI, Inc.

//! EC2 Tag Store Adapter
//!
//! Reads and writes instance tags through the EC2 API:
//!
//! ```text
//! read_tags(identity)        = DescribeInstances(InstanceIds=[id])
//! write_name_tag(identity,h) = CreateTags(Resources=[id], Tags=[Name=h])
//! ```
//!
//! Credentials come from the default provider chain (instance profile on
//! EC2). Each call targets the region of the identity it is given.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::types::Tag;
use aws_sdk_ec2::Client;
use tracing::{debug, info};

use super::TagStore;
use crate::domain::{Hostname, InstanceIdentity, TagSet, NAME_KEY};
use crate::errors::{TagError, TagResult};

/// EC2-backed [`TagStore`]
#[derive(Debug, Clone)]
pub struct Ec2TagStore {
    sdk_config: SdkConfig,
}

impl Ec2TagStore {
    /// Load credentials and settings from the environment
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(sdk_config)
    }

    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }

    fn client(&self, region: &str) -> Client {
        let config = aws_sdk_ec2::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        Client::from_conf(config)
    }
}

#[async_trait]
impl TagStore for Ec2TagStore {
    async fn read_tags(&self, identity: &InstanceIdentity) -> TagResult<TagSet> {
        debug!("Describing instance {} in {}", identity.id(), identity.region());

        let output = self
            .client(identity.region())
            .describe_instances()
            .instance_ids(identity.id())
            .send()
            .await
            .map_err(|e| tag_error(e, identity.id()))?;

        let instances: Vec<_> = output
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .collect();

        if instances.is_empty() {
            return Err(TagError::NotFound(identity.id().to_string()));
        }

        let tags: TagSet = instances
            .iter()
            .flat_map(|instance| instance.tags())
            .filter_map(|tag| Some((tag.key()?, tag.value().unwrap_or_default())))
            .collect();

        debug!("Instance {} carries {} tags", identity.id(), tags.len());
        Ok(tags)
    }

    async fn write_name_tag(
        &self,
        identity: &InstanceIdentity,
        hostname: &Hostname,
    ) -> TagResult<()> {
        self.client(identity.region())
            .create_tags()
            .resources(identity.id())
            .tags(Tag::builder().key(NAME_KEY).value(hostname.as_str()).build())
            .send()
            .await
            .map_err(|e| tag_error(e, identity.id()))?;

        info!("Tagged instance {} with Name={}", identity.id(), hostname);
        Ok(())
    }
}

fn tag_error<E, R>(err: SdkError<E, R>, instance_id: &str) -> TagError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.as_service_error().and_then(|e| e.code()).map(str::to_string);
    classify(code.as_deref(), instance_id, DisplayErrorContext(&err).to_string())
}

/// Map an EC2 error code onto the tag error taxonomy
fn classify(code: Option<&str>, instance_id: &str, message: String) -> TagError {
    match code {
        Some("InvalidInstanceID.NotFound") | Some("InvalidInstanceID.Malformed") => {
            TagError::NotFound(instance_id.to_string())
        }
        Some("UnauthorizedOperation") | Some("AuthFailure") => TagError::Unauthorized(message),
        _ => TagError::Api(message),
    }
}
