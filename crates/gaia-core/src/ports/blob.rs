use async_trait::async_trait;

use crate::content::{ContentFile, ListOptions, UploadOptions};

use super::RemoteError;

/// Object storage bucket used by the content library.
#[async_trait]
pub trait BlobStoragePort: Send + Sync {
    async fn list(&self, prefix: &str, options: &ListOptions)
        -> Result<Vec<ContentFile>, RemoteError>;

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), RemoteError>;

    /// Public URL for `path`. Only reachable when the bucket is public.
    fn public_url(&self, path: &str) -> String;
}
