use std::sync::Arc;

use crate::resilience::WarnLimiter;
use crate::session::SessionCoordinator;
use crate::usecases::profile::{ProfileCache, ProfileGateway, ProfileLoader};
use crate::usecases::steps::ProfileSteps;
use crate::usecases::{CartStore, CheckAdmin, ContentLibrary};
use crate::AppDeps;

/// The assembled client runtime.
///
/// One instance lives for the whole process. Everything tied to a signed-in
/// user is owned by the [`SessionCoordinator`] and reset on sign-out.
pub struct GaiaApp {
    session: Arc<SessionCoordinator>,
    steps: ProfileSteps,
    cart: CartStore,
    contents: ContentLibrary,
}

impl GaiaApp {
    pub fn new(deps: AppDeps) -> Self {
        let warn = Arc::new(WarnLimiter::new());
        let gateway = Arc::new(ProfileGateway::new(
            deps.profile_store,
            ProfileCache::new(deps.local_store.clone()),
            deps.clock.clone(),
            warn.clone(),
        ));
        let loader = Arc::new(ProfileLoader::new(gateway.clone()));
        let admin = Arc::new(CheckAdmin::new(deps.admin_flags, deps.admin_allow_list));

        Self {
            session: Arc::new(SessionCoordinator::new(
                deps.session,
                loader.clone(),
                admin,
                warn,
            )),
            steps: ProfileSteps::new(gateway, loader, deps.clock.clone()),
            cart: CartStore::new(deps.local_store),
            contents: ContentLibrary::new(deps.blobs, deps.clock, deps.upload_prefix),
        }
    }

    pub fn session(&self) -> &Arc<SessionCoordinator> {
        &self.session
    }

    pub fn steps(&self) -> &ProfileSteps {
        &self.steps
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn contents(&self) -> &ContentLibrary {
        &self.contents
    }
}
