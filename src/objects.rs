use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use serde::Serialize;

use crate::config::ObjectsConfig;

/// Binary object storage for uploaded images and PDFs. The rest of the
/// system only ever persists the returned URL strings; file bytes are never
/// inspected.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn store(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<String>;
    async fn delete(&self, url: &str) -> anyhow::Result<()>;
    async fn list(&self, prefix: &str) -> anyhow::Result<Vec<StoredObject>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredObject {
    pub url: String,
    pub key: String,
    pub size: i64,
}

#[derive(Clone)]
pub struct S3Objects {
    client: Client,
    bucket: String,
    public_base: String,
}

impl S3Objects {
    pub async fn new(config: &ObjectsConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(Credentials::new(
                config.access_key.as_str(),
                config.secret_key.as_str(),
                None,
                None,
                "static",
            ))
            .endpoint_url(config.endpoint.as_str())
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(config.endpoint.as_str())
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: config.bucket.clone(),
            public_base: format!(
                "{}/{}",
                config.endpoint.trim_end_matches('/'),
                config.bucket
            ),
        })
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }

    fn key_from_url<'a>(&self, url: &'a str) -> anyhow::Result<&'a str> {
        url.strip_prefix(&self.public_base)
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|key| !key.is_empty())
            .context("URL does not belong to this bucket")
    }
}

#[async_trait]
impl ObjectStore for S3Objects {
    async fn store(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(self.url_for(key))
    }

    async fn delete(&self, url: &str) -> anyhow::Result<()> {
        let key = self.key_from_url(url)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> anyhow::Result<Vec<StoredObject>> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .send()
            .await
            .context("s3 list_objects_v2")?;

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?.to_string();
                Some(StoredObject {
                    url: self.url_for(&key),
                    size: object.size().unwrap_or(0),
                    key,
                })
            })
            .collect())
    }
}
