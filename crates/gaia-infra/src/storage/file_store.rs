use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use gaia_core::ports::{LocalStoreError, LocalStorePort};
use tracing::{debug, warn};

const STORE_FILE_NAME: &str = "local_store.json";

/// Key/value store persisted as a single JSON object under the data directory.
///
/// Entries are held in memory and the whole file is rewritten on every
/// change (temp file + rename), so a crash leaves either the old or the new
/// contents.
pub struct FileLocalStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileLocalStore {
    /// Opens the store in `dir`, creating the directory if needed.
    ///
    /// A missing file is an empty store. A corrupt file is logged and treated
    /// as empty; it is replaced on the next write.
    pub fn open(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("create local store dir failed: {}", dir.display()))?;
        let path = dir.join(STORE_FILE_NAME);

        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "local store file is corrupt; starting empty");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("read local store failed: {}", path.display()))
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "local store opened");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), LocalStoreError> {
        let content =
            serde_json::to_string(entries).map_err(|e| LocalStoreError::Other(e.to_string()))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(io_error)?;
        fs::rename(&tmp_path, &self.path).map_err(io_error)
    }
}

fn io_error(err: std::io::Error) -> LocalStoreError {
    match err.kind() {
        ErrorKind::StorageFull => LocalStoreError::QuotaExceeded,
        ErrorKind::PermissionDenied | ErrorKind::NotFound => {
            LocalStoreError::Unavailable(err.to_string())
        }
        _ => LocalStoreError::Other(err.to_string()),
    }
}

impl LocalStorePort for FileLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let mut entries = self.lock();
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist(&entries) {
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        let mut entries = self.lock();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries)
    }
}
