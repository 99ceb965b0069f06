use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;

use crate::config::StorageConfig;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    /// Durable public URL for a stored object.
    fn public_url(&self, key: &str) -> String;
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl Storage {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new("us-east-1".to_string()))
            .credentials_provider(Credentials::new(
                cfg.access_key.clone(),
                cfg.secret_key.clone(),
                None,
                None,
                "static",
            ))
            .endpoint_url(cfg.endpoint.clone())
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(cfg.endpoint.clone())
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            public_base_url: cfg.public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
