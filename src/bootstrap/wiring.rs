//! # Dependency Injection
//!
//! Creates the infra adapters and hands them to [`GaiaApp`]. The only place
//! that depends on `gaia-infra` and `gaia-app` together. Assembly only: no
//! business decisions and no config validation.

use std::path::PathBuf;
use std::sync::Arc;

use gaia_app::{AppDeps, GaiaApp};
use gaia_core::admin::AdminAllowList;
use gaia_core::config::AppConfig;
use gaia_core::ports::{ClockPort, LocalStorePort};
use gaia_infra::{
    BackendClient, FileLocalStore, HttpAdminTable, HttpAuth, HttpBlobStorage, HttpProfileStore,
    MemoryLocalStore, SystemClock,
};
use tracing::{info, warn};

const APP_DIR_NAME: &str = "gaia";

pub type WiringResult<T> = Result<T, WiringError>;

#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Backend client initialization failed: {0}")]
    BackendInit(String),
}

/// Directory used when the config does not name one.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Fills every empty value of `loaded` from `defaults`.
pub fn resolve_config(loaded: AppConfig, defaults: AppConfig) -> AppConfig {
    fn pick(value: String, default: String) -> String {
        if value.is_empty() {
            default
        } else {
            value
        }
    }
    fn pick_path(value: PathBuf, default: PathBuf) -> PathBuf {
        if value.as_os_str().is_empty() {
            default
        } else {
            value
        }
    }

    AppConfig {
        backend_url: pick(loaded.backend_url, defaults.backend_url),
        anon_key: pick(loaded.anon_key, defaults.anon_key),
        profiles_table: pick(loaded.profiles_table, defaults.profiles_table),
        admins_table: pick(loaded.admins_table, defaults.admins_table),
        storage_bucket: pick(loaded.storage_bucket, defaults.storage_bucket),
        upload_prefix: pick(loaded.upload_prefix, defaults.upload_prefix),
        data_dir: pick_path(loaded.data_dir, defaults.data_dir),
        log_dir: pick_path(loaded.log_dir, defaults.log_dir),
        admin_fallback_emails: if loaded.admin_fallback_emails.is_empty() {
            defaults.admin_fallback_emails
        } else {
            loaded.admin_fallback_emails
        },
    }
}

/// Local storage is best-effort: an unusable data directory degrades to an
/// in-memory store for this run.
fn open_local_store(config: &AppConfig) -> Arc<dyn LocalStorePort> {
    match FileLocalStore::open(&config.data_dir) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            warn!(error = %err, "local store unavailable; using in-memory store");
            Arc::new(MemoryLocalStore::new())
        }
    }
}

/// Wires adapters for `config` into a ready [`GaiaApp`].
pub fn build_app(config: &AppConfig) -> WiringResult<GaiaApp> {
    let client = Arc::new(
        BackendClient::new(&config.backend_url, &config.anon_key)
            .map_err(|e| WiringError::BackendInit(format!("{e:#}")))?,
    );
    let local_store = open_local_store(config);
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);

    let deps = AppDeps {
        session: Arc::new(HttpAuth::new(client.clone(), local_store.clone(), clock.clone())),
        profile_store: Arc::new(HttpProfileStore::new(client.clone(), &config.profiles_table)),
        admin_flags: Arc::new(HttpAdminTable::new(client.clone(), &config.admins_table)),
        blobs: Arc::new(HttpBlobStorage::new(client, &config.storage_bucket)),
        local_store,
        clock,
        admin_allow_list: AdminAllowList::new(&config.admin_fallback_emails),
        upload_prefix: config.upload_prefix.clone(),
    };

    info!(backend = %config.backend_url, data_dir = %config.data_dir.display(), "app wired");
    Ok(GaiaApp::new(deps))
}
