//! Dependency grouping for [`GaiaApp`](crate::GaiaApp) construction.
//!
//! A plain struct: no defaults, no build steps. The constructor signature of
//! the app is the dependency manifest.

use std::sync::Arc;

use gaia_core::admin::AdminAllowList;
use gaia_core::ports::{
    AdminFlagPort, BlobStoragePort, ClockPort, LocalStorePort, ProfileStorePort, SessionPort,
};

pub struct AppDeps {
    // Remote backend
    pub session: Arc<dyn SessionPort>,
    pub profile_store: Arc<dyn ProfileStorePort>,
    pub admin_flags: Arc<dyn AdminFlagPort>,
    pub blobs: Arc<dyn BlobStoragePort>,

    // Device
    pub local_store: Arc<dyn LocalStorePort>,
    pub clock: Arc<dyn ClockPort>,

    // Settings
    pub admin_allow_list: AdminAllowList,
    pub upload_prefix: String,
}
