use std::sync::Arc;
use std::time::Duration;

use gaia_core::content::{upload_path, ContentError, ContentFile, ListOptions, UploadOptions};
use gaia_core::ports::{BlobStoragePort, ClockPort};
use tracing::{info, info_span, Instrument};

use crate::resilience::{attempt_with_retry, RetryPolicy};

const STORAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Admin content library backed by the storage bucket.
pub struct ContentLibrary {
    blobs: Arc<dyn BlobStoragePort>,
    clock: Arc<dyn ClockPort>,
    prefix: String,
}

impl ContentLibrary {
    pub fn new(blobs: Arc<dyn BlobStoragePort>, clock: Arc<dyn ClockPort>, prefix: impl Into<String>) -> Self {
        Self {
            blobs,
            clock,
            prefix: prefix.into(),
        }
    }

    /// First page of uploads, newest first.
    pub async fn list_contents(&self) -> Result<Vec<ContentFile>, ContentError> {
        let policy = RetryPolicy::single(STORAGE_TIMEOUT, "Storage timeout ao listar arquivos");
        let options = &ListOptions::newest_first();
        let files = attempt_with_retry(
            &policy,
            move |_| self.blobs.list(&self.prefix, options),
            |_, _| std::ops::ControlFlow::Continue(()),
        )
        .instrument(info_span!("usecase.list_contents.execute", prefix = %self.prefix))
        .await?;
        Ok(files)
    }

    /// Uploads under a timestamped, sanitized name and returns its public URL.
    pub async fn upload_content(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ContentError> {
        if file_name.trim().is_empty() {
            return Err(ContentError::NoFile);
        }
        let path = upload_path(&self.prefix, file_name, self.clock.now_utc());
        let span = info_span!("usecase.upload_content.execute", path = %path, size = bytes.len());
        async {
            let policy = RetryPolicy::single(STORAGE_TIMEOUT, "Storage timeout ao enviar arquivo");
            let options = &UploadOptions::default();
            let (path, bytes) = (&path, &bytes);
            attempt_with_retry(
                &policy,
                move |_| self.blobs.upload(path, bytes.clone(), options),
                |_, _| std::ops::ControlFlow::Continue(()),
            )
            .await?;

            let url = self.blobs.public_url(path);
            info!(url = %url, "content uploaded");
            Ok(url)
        }
        .instrument(span)
        .await
    }
}
