use std::sync::Arc;

use gaia_core::ports::LocalStorePort;
use gaia_core::{Profile, UserId};
use tracing::debug;

const CACHE_KEY_PREFIX: &str = "gaia.profile.cache:";

/// Last known good profile per user id, kept in local storage.
///
/// Every operation is best-effort: storage or decoding failures read as a
/// miss and failed writes are dropped.
#[derive(Clone)]
pub struct ProfileCache {
    store: Arc<dyn LocalStorePort>,
}

impl ProfileCache {
    pub fn new(store: Arc<dyn LocalStorePort>) -> Self {
        Self { store }
    }

    pub fn key(user_id: &UserId) -> String {
        if user_id.is_empty() {
            format!("{CACHE_KEY_PREFIX}anon")
        } else {
            format!("{CACHE_KEY_PREFIX}{user_id}")
        }
    }

    pub fn read(&self, user_id: &UserId) -> Option<Profile> {
        let raw = match self.store.get(&Self::key(user_id)) {
            Ok(raw) => raw?,
            Err(err) => {
                debug!(user_id = %user_id, error = %err, "profile cache read failed");
                return None;
            }
        };
        match serde_json::from_str::<Profile>(&raw) {
            Ok(profile) => Some(profile),
            Err(err) => {
                debug!(user_id = %user_id, error = %err, "discarding unreadable profile cache");
                None
            }
        }
    }

    pub fn write(&self, profile: &Profile) {
        let json = match serde_json::to_string(profile) {
            Ok(json) => json,
            Err(err) => {
                debug!(user_id = %profile.id, error = %err, "profile cache encode failed");
                return;
            }
        };
        if let Err(err) = self.store.set(&Self::key(&profile.id), &json) {
            debug!(user_id = %profile.id, error = %err, "profile cache write failed");
        }
    }

    pub fn clear(&self, user_id: &UserId) {
        if let Err(err) = self.store.remove(&Self::key(user_id)) {
            debug!(user_id = %user_id, error = %err, "profile cache clear failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaia_core::ports::LocalStoreError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        entries: Mutex<HashMap<String, String>>,
        fail_writes: bool,
    }

    impl LocalStorePort for MapStore {
        fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
            if self.fail_writes {
                return Err(LocalStoreError::QuotaExceeded);
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[test]
    fn key_is_per_user() {
        assert_eq!(ProfileCache::key(&UserId::from("u-1")), "gaia.profile.cache:u-1");
        assert_eq!(ProfileCache::key(&UserId::default()), "gaia.profile.cache:anon");
    }

    #[test]
    fn write_then_read_returns_profile() {
        let cache = ProfileCache::new(Arc::new(MapStore::default()));
        let mut profile = Profile::new(UserId::from("u-1"));
        profile.full_name = Some("Ana".into());

        cache.write(&profile);

        assert_eq!(cache.read(&UserId::from("u-1")), Some(profile));
        assert_eq!(cache.read(&UserId::from("u-2")), None);
    }

    #[test]
    fn corrupt_entry_reads_as_miss() {
        let store = Arc::new(MapStore::default());
        store.set("gaia.profile.cache:u-1", "{not json").unwrap();
        let cache = ProfileCache::new(store);

        assert_eq!(cache.read(&UserId::from("u-1")), None);
    }

    #[test]
    fn failed_write_is_swallowed() {
        let cache = ProfileCache::new(Arc::new(MapStore {
            fail_writes: true,
            ..Default::default()
        }));

        cache.write(&Profile::new(UserId::from("u-1")));

        assert_eq!(cache.read(&UserId::from("u-1")), None);
    }
}
