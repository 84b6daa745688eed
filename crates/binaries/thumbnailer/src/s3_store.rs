use app_state::AwsSettings;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use color_eyre::eyre::{Result, WrapErr};
use generate_thumbnails::{ObjectStore, StoredObject};

/// [`ObjectStore`] on top of S3. Containers are buckets.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the default credential chain, once per process.
    pub async fn from_settings(settings: &AwsSettings) -> Self {
        let shared_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(settings.force_path_style);
        if let Some(endpoint_url) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, container: &str, key: &str) -> Result<StoredObject> {
        let response = self
            .client
            .get_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .wrap_err_with(|| format!("get_object failed for {container}/{key}"))?;

        let content_type = response.content_type().map(str::to_string);
        let body = response
            .body
            .collect()
            .await
            .wrap_err_with(|| format!("failed to read body of {container}/{key}"))?;

        Ok(StoredObject {
            bytes: body.into_bytes().to_vec(),
            content_type,
        })
    }

    async fn put(
        &self,
        container: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(container)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .wrap_err_with(|| format!("put_object failed for {container}/{key}"))?;
        Ok(())
    }
}
