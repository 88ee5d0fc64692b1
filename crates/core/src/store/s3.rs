//! S3/MinIO-compatible blob store, using the `rust-s3` crate.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use crate::document::ImageFile;

use super::blob::{BlobError, BlobErrorKind, BlobStore};

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// API endpoint, e.g. `http://localhost:9000`.
    pub endpoint: String,
    /// Base used when building public object URLs; usually the CDN or the
    /// externally reachable endpoint.
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

pub struct S3BlobStore {
    bucket: Box<Bucket>,
    public_endpoint: String,
}

impl S3BlobStore {
    pub fn new(config: S3Config) -> Result<Self, BlobError> {
        let setup_error =
            |e: &dyn std::fmt::Display| BlobError::upload(BlobErrorKind::Unknown, "", e.to_string());

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| setup_error(&e))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket =
            Bucket::new(&config.bucket, region, credentials).map_err(|e| setup_error(&e))?;
        // MinIO wants http://endpoint/bucket rather than http://bucket.endpoint
        bucket.set_path_style();

        tracing::info!(
            endpoint = %config.endpoint,
            bucket = %config.bucket,
            "S3 blob store initialized"
        );

        Ok(Self {
            bucket,
            public_endpoint: config.public_endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn public_url(&self, key: &str) -> String {
        let encoded: Vec<_> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/{}/{}",
            self.public_endpoint,
            self.bucket.name(),
            encoded.join("/")
        )
    }
}

fn kind_for_status(status: u16) -> BlobErrorKind {
    match status {
        401 | 403 => BlobErrorKind::PermissionDenied,
        499 => BlobErrorKind::Canceled,
        _ => BlobErrorKind::Unknown,
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(&self, file: &ImageFile, path: &str) -> Result<String, BlobError> {
        let response = self
            .bucket
            .put_object_with_content_type(path, &file.bytes, &file.content_type)
            .await
            .map_err(|e| BlobError::upload(BlobErrorKind::Unknown, path, e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(BlobError::upload(
                kind_for_status(status),
                path,
                format!("storage responded with HTTP {status}"),
            ));
        }

        tracing::debug!(path, bucket = %self.bucket.name(), "uploaded object");
        Ok(self.public_url(path))
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let response = self
            .bucket
            .delete_object(path)
            .await
            .map_err(|e| BlobError::delete(BlobErrorKind::Unknown, path, e.to_string()))?;

        match response.status_code() {
            200..=299 => {
                tracing::debug!(path, bucket = %self.bucket.name(), "deleted object");
                Ok(())
            }
            404 => {
                tracing::debug!(path, "object already absent");
                Ok(())
            }
            status => Err(BlobError::delete(
                kind_for_status(status),
                path,
                format!("storage responded with HTTP {status}"),
            )),
        }
    }
}
