use crate::keys::object_key;
use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, ObjectStore, PutOptions, PutPayload, Result as ObjectResult,
};

/// S3 blob store implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    prefix: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    public_base_url: Option<String>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `prefix` - Key prefix every object is stored under
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        prefix: String,
    ) -> StorageResult<Self> {
        // Credentials come from the environment; bucket and region are explicit.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            prefix,
            endpoint_url,
            public_base_url: None,
        })
    }

    /// Serve links from a CDN or custom domain instead of the bucket URL.
    pub fn with_public_base_url(mut self, public_base_url: Option<String>) -> Self {
        self.public_base_url = public_base_url;
        self
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style URLs on the endpoint.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref base_url) = self.public_base_url {
            format!("{}/{}", base_url.trim_end_matches('/'), key)
        } else if let Some(ref endpoint) = self.endpoint_url {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl BlobStore for S3Storage {
    async fn upload(
        &self,
        public_id: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        let key = object_key(&self.prefix, public_id, content_type)?;
        let size = data.len() as u64;
        let location = Path::from(key.clone());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(data), options)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage(endpoint: Option<&str>) -> S3Storage {
        S3Storage::new(
            "imgops-test".to_string(),
            "eu-west-1".to_string(),
            endpoint.map(String::from),
            "images".to_string(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_aws_url_format() {
        let storage = storage(None).await;
        assert_eq!(
            storage.generate_url("images/png_1.png"),
            "https://imgops-test.s3.eu-west-1.amazonaws.com/images/png_1.png"
        );
    }

    #[tokio::test]
    async fn test_custom_endpoint_uses_path_style() {
        let storage = storage(Some("http://localhost:9000/")).await;
        assert_eq!(
            storage.generate_url("images/png_1.png"),
            "http://localhost:9000/imgops-test/images/png_1.png"
        );
    }

    #[tokio::test]
    async fn test_public_base_url_wins() {
        let storage = storage(Some("http://localhost:9000"))
            .await
            .with_public_base_url(Some("https://cdn.example.com/".to_string()));
        assert_eq!(
            storage.generate_url("images/png_1.png"),
            "https://cdn.example.com/images/png_1.png"
        );
    }
}
