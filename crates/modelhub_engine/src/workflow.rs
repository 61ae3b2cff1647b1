//! Server-side orchestration over the storage and translation adapters.

use hub_logging::hub_warn;
use serde::Serialize;

use crate::{BackendError, DerivativeClient, OssClient};

/// One listed bucket or model: the backend name plus its encoded token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrnEntry {
    pub name: String,
    pub urn: String,
}

/// Sequencing layer consumed by the route handlers. Holds no state beyond
/// the adapter clients and the default bucket name.
#[derive(Clone)]
pub struct Workflow {
    oss: OssClient,
    derivative: DerivativeClient,
    default_bucket: String,
}

impl Workflow {
    pub fn new(oss: OssClient, derivative: DerivativeClient, default_bucket: String) -> Self {
        Self {
            oss,
            derivative,
            default_bucket,
        }
    }

    pub fn default_bucket(&self) -> &str {
        &self.default_bucket
    }

    /// Lists all buckets as `{name, urn}` entries.
    pub async fn list_buckets(&self) -> Result<Vec<UrnEntry>, BackendError> {
        let buckets = self.oss.list_buckets().await?;
        Ok(buckets
            .into_iter()
            .map(|bucket| UrnEntry {
                urn: modelhub_core::encode(&bucket.bucket_key),
                name: bucket.bucket_key,
            })
            .collect())
    }

    /// Lists all models in `bucket`, or in the default bucket when none is
    /// given. Only the default bucket is auto-provisioned; a missing
    /// explicitly-named bucket surfaces the backend's 404.
    pub async fn list_models(&self, bucket: Option<&str>) -> Result<Vec<UrnEntry>, BackendError> {
        let bucket = match bucket {
            Some(bucket) => bucket,
            None => {
                self.oss.ensure_bucket(&self.default_bucket).await?;
                &self.default_bucket
            }
        };
        let objects = self.oss.list_objects(bucket).await?;
        Ok(objects
            .into_iter()
            .map(|object| UrnEntry {
                urn: modelhub_core::encode(&object.object_id),
                name: object.object_key,
            })
            .collect())
    }

    /// Stores a model file and queues its translation.
    ///
    /// Ensures the target bucket exists, uploads, then submits the job;
    /// the entry-point filename is forwarded only for `.zip` archives.
    /// There is no rollback: both steps are safe to retry manually, so a
    /// late failure leaves the earlier ones in place.
    pub async fn upload_and_translate(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        bucket: Option<&str>,
        zip_entrypoint: Option<&str>,
    ) -> Result<UrnEntry, BackendError> {
        let bucket = bucket.unwrap_or(&self.default_bucket);
        self.oss.ensure_bucket(bucket).await?;

        let object_id = self.oss.upload_object(bucket, file_name, bytes).await?;
        let urn = modelhub_core::encode(&object_id);

        let is_archive = file_name.to_ascii_lowercase().ends_with(".zip");
        let root_filename = if is_archive { zip_entrypoint } else { None };
        self.derivative.submit_job(&urn, root_filename).await?;

        Ok(UrnEntry {
            name: file_name.to_string(),
            urn,
        })
    }

    /// Creates a bucket; a 409 propagates for the handler's conflict
    /// mapping.
    pub async fn create_bucket(&self, bucket: &str) -> Result<UrnEntry, BackendError> {
        self.oss.create_bucket(bucket).await?;
        Ok(UrnEntry {
            name: bucket.to_string(),
            urn: modelhub_core::encode(bucket),
        })
    }

    /// Deletes a bucket after best-effort object cleanup. Objects that
    /// fail to delete are logged and skipped; the bucket delete still runs.
    pub async fn delete_bucket(&self, bucket: &str) -> Result<(), BackendError> {
        let objects = self.oss.list_objects(bucket).await?;
        for object in objects {
            if let Err(err) = self.oss.delete_object(bucket, &object.object_key).await {
                hub_warn!(
                    "Failed to delete object {} from bucket {}: {}",
                    object.object_key,
                    bucket,
                    err
                );
            }
        }
        self.oss.delete_bucket(bucket).await
    }
}
