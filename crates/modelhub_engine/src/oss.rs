//! Object-storage operations: buckets, objects, and exhaustive pagination.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{AuthClient, BackendError, INTERNAL_SCOPE};

/// Fixed page size requested from the listing endpoints.
pub const PAGE_LIMIT: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BucketInfo {
    #[serde(rename = "bucketKey")]
    pub bucket_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectInfo {
    #[serde(rename = "objectKey")]
    pub object_key: String,
    #[serde(rename = "objectId")]
    pub object_id: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// One page of a cursor-based listing. `next` carries the continuation URL
/// whose `startAt` query parameter is the cursor for the following page.
#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadReceipt {
    #[serde(rename = "objectId")]
    object_id: String,
}

/// Adapter for the storage backend's bucket/object surface.
#[derive(Clone)]
pub struct OssClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthClient,
}

impl OssClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, auth: AuthClient) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            auth,
        }
    }

    async fn bearer(&self) -> Result<String, BackendError> {
        Ok(self.auth.token(INTERNAL_SCOPE).await?.access_token)
    }

    /// Builds an endpoint URL from path segments. Each segment is
    /// percent-encoded, so object names containing `#`, `?` or spaces
    /// address the right key instead of truncating the path.
    fn endpoint(&self, segments: &[&str]) -> Result<url::Url, BackendError> {
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|err| BackendError::malformed(format!("malformed backend base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::malformed("backend base url cannot hold a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Lists every bucket, walking all pages.
    pub async fn list_buckets(&self) -> Result<Vec<BucketInfo>, BackendError> {
        self.collect_pages(self.endpoint(&["oss", "v2", "buckets"])?)
            .await
    }

    /// Lists every object in `bucket`, walking all pages.
    pub async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectInfo>, BackendError> {
        self.collect_pages(self.endpoint(&["oss", "v2", "buckets", bucket, "objects"])?)
            .await
    }

    /// Exhaustively follows the continuation cursor and concatenates all
    /// pages. A failure on any page fails the whole walk; no partial
    /// results are returned.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        endpoint: url::Url,
    ) -> Result<Vec<T>, BackendError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let token = self.bearer().await?;
            let mut request = self
                .http
                .get(endpoint.clone())
                .bearer_auth(token)
                .query(&[("limit", PAGE_LIMIT.to_string())]);
            if let Some(start_at) = &cursor {
                request = request.query(&[("startAt", start_at)]);
            }
            let response = request.send().await.map_err(BackendError::transport)?;
            if !response.status().is_success() {
                return Err(BackendError::from_response(response).await);
            }
            let page: Page<T> = response.json().await.map_err(BackendError::transport)?;
            items.extend(page.items);
            match page.next {
                None => break,
                Some(next) => cursor = Some(cursor_from_next(&next)?),
            }
        }
        Ok(items)
    }

    /// Checks whether `bucket` exists.
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool, BackendError> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(self.endpoint(&["oss", "v2", "buckets", bucket, "details"])?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(BackendError::transport)?;
        if response.status().is_success() {
            return Ok(true);
        }
        let err = BackendError::from_response(response).await;
        if err.is_not_found() {
            Ok(false)
        } else {
            Err(err)
        }
    }

    /// Creates `bucket` with the transient retention policy. A name
    /// conflict surfaces as a 409 `BackendError`.
    pub async fn create_bucket(&self, bucket: &str) -> Result<(), BackendError> {
        let token = self.bearer().await?;
        let response = self
            .http
            .post(self.endpoint(&["oss", "v2", "buckets"])?)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "bucketKey": bucket,
                "policyKey": "transient",
            }))
            .send()
            .await
            .map_err(BackendError::transport)?;
        if !response.status().is_success() {
            return Err(BackendError::from_response(response).await);
        }
        Ok(())
    }

    /// Makes sure `bucket` exists, creating it when absent.
    ///
    /// Check-then-create is not atomic against concurrent creators; a 409
    /// from the create after the check found the bucket absent means
    /// someone else won the race, which is as good as success.
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<(), BackendError> {
        if self.bucket_exists(bucket).await? {
            return Ok(());
        }
        match self.create_bucket(bucket).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_conflict() => Ok(()),
            Err(err) => Err(err),
        }
    }

    pub async fn delete_bucket(&self, bucket: &str) -> Result<(), BackendError> {
        let token = self.bearer().await?;
        let response = self
            .http
            .delete(self.endpoint(&["oss", "v2", "buckets", bucket])?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(BackendError::transport)?;
        if !response.status().is_success() {
            return Err(BackendError::from_response(response).await);
        }
        Ok(())
    }

    pub async fn delete_object(&self, bucket: &str, object: &str) -> Result<(), BackendError> {
        let token = self.bearer().await?;
        let response = self
            .http
            .delete(self.endpoint(&["oss", "v2", "buckets", bucket, "objects", object])?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(BackendError::transport)?;
        if !response.status().is_success() {
            return Err(BackendError::from_response(response).await);
        }
        Ok(())
    }

    /// Stores `bytes` under `bucket/object` and returns the backend's
    /// object identifier.
    pub async fn upload_object(
        &self,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        let token = self.bearer().await?;
        let response = self
            .http
            .put(self.endpoint(&["oss", "v2", "buckets", bucket, "objects", object])?)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(BackendError::transport)?;
        if !response.status().is_success() {
            return Err(BackendError::from_response(response).await);
        }
        let receipt: UploadReceipt = response.json().await.map_err(BackendError::transport)?;
        Ok(receipt.object_id)
    }
}

fn cursor_from_next(next: &str) -> Result<String, BackendError> {
    let parsed = url::Url::parse(next)
        .map_err(|err| BackendError::malformed(format!("malformed continuation url: {err}")))?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "startAt")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| BackendError::malformed("continuation url without startAt cursor"))
}
