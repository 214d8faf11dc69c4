use std::sync::Arc;

use async_trait::async_trait;
use gaia_core::content::{ContentFile, ListOptions, UploadOptions};
use gaia_core::ports::{BlobStoragePort, RemoteError};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::error::{classify_transport, ensure_success};
use super::BackendClient;

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    name: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    metadata: Option<ObjectMetadata>,
}

#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    #[serde(default)]
    size: Option<u64>,
}

impl From<ObjectEntry> for ContentFile {
    fn from(entry: ObjectEntry) -> Self {
        ContentFile {
            name: entry.name,
            created_at: entry.created_at,
            size: entry.metadata.and_then(|m| m.size),
        }
    }
}

/// One object-storage bucket.
pub struct HttpBlobStorage {
    client: Arc<BackendClient>,
    bucket: String,
}

impl HttpBlobStorage {
    pub fn new(client: Arc<BackendClient>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    fn list_body(prefix: &str, options: &ListOptions) -> serde_json::Value {
        json!({
            "prefix": prefix,
            "limit": options.limit,
            "offset": options.offset,
            "sortBy": { "column": options.sort_column, "order": options.sort_order },
        })
    }
}

#[async_trait]
impl BlobStoragePort for HttpBlobStorage {
    async fn list(
        &self,
        prefix: &str,
        options: &ListOptions,
    ) -> Result<Vec<ContentFile>, RemoteError> {
        let url = self.client.storage_url(&format!("object/list/{}", self.bucket));
        let response = self
            .client
            .request(Method::POST, &url)
            .json(&Self::list_body(prefix, options))
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;
        let entries: Vec<ObjectEntry> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Other(format!("invalid object listing: {e}")))?;
        Ok(entries.into_iter().map(ContentFile::from).collect())
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), RemoteError> {
        let size = bytes.len();
        let url = self.client.storage_url(&format!("object/{}/{}", self.bucket, path));
        let response = self
            .client
            .request(Method::POST, &url)
            .header("cache-control", format!("max-age={}", options.cache_control))
            .header("x-upsert", options.upsert.to_string())
            .body(bytes)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;
        ensure_success(response).await?;
        info!(bucket = %self.bucket, path, size, "object uploaded");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.client
            .storage_url(&format!("object/public/{}/{}", self.bucket, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket() -> HttpBlobStorage {
        let client = BackendClient::new("https://demo.backend.example", "anon").unwrap();
        HttpBlobStorage::new(Arc::new(client), "contents")
    }

    #[test]
    fn public_url_points_at_public_object() {
        assert_eq!(
            bucket().public_url("uploads/2026-10-17T12-00-00-000Z-guia.pdf"),
            "https://demo.backend.example/storage/v1/object/public/contents/uploads/2026-10-17T12-00-00-000Z-guia.pdf"
        );
    }

    #[test]
    fn list_body_sorts_newest_first() {
        let body = HttpBlobStorage::list_body("uploads", &ListOptions::newest_first());
        assert_eq!(
            body,
            json!({
                "prefix": "uploads",
                "limit": 100,
                "offset": 0,
                "sortBy": { "column": "created_at", "order": "desc" },
            })
        );
    }

    #[test]
    fn listing_entry_maps_size_from_metadata() {
        let entry: ObjectEntry = serde_json::from_value(json!({
            "name": "guia.pdf",
            "created_at": "2026-10-17T12:00:00Z",
            "metadata": { "size": 2048, "mimetype": "application/pdf" },
        }))
        .unwrap();
        assert_eq!(
            ContentFile::from(entry),
            ContentFile {
                name: "guia.pdf".into(),
                created_at: Some("2026-10-17T12:00:00Z".into()),
                size: Some(2048),
            }
        );
    }
}
