//! End-to-end onboarding through the app facade, with in-memory backend
//! fakes and the file-backed local store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gaia_app::{AppDeps, GaiaApp};
use gaia_core::admin::AdminAllowList;
use gaia_core::content::{ContentFile, ListOptions, UploadOptions};
use gaia_core::ports::{
    AdminFlagPort, BlobStoragePort, ProfileStorePort, RemoteError, SessionPort,
};
use gaia_core::profile::{AgeRange, PersonalInfoForm};
use gaia_core::routing::{GuardOutcome, Route};
use gaia_core::{ProfileRecord, Session, TriageMap, UserId};
use gaia_app::usecases::steps::PreferencesForm;
use gaia_infra::{FileLocalStore, SystemClock};
use serde_json::{Map, Value};
use tempfile::TempDir;

#[derive(Default)]
struct Profiles {
    rows: Mutex<HashMap<UserId, Map<String, Value>>>,
}

#[async_trait]
impl ProfileStorePort for Profiles {
    async fn fetch(&self, user_id: &UserId, _columns: &[&str]) -> Result<Option<ProfileRecord>, RemoteError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(user_id)
            .map(|row| serde_json::from_value(Value::Object(row.clone())).unwrap()))
    }

    async fn upsert(&self, row: Map<String, Value>) -> Result<Option<ProfileRecord>, RemoteError> {
        let id = UserId::from(row["id"].as_str().unwrap());
        let mut rows = self.rows.lock().unwrap();
        let stored = rows.entry(id).or_default();
        stored.extend(row);
        Ok(Some(serde_json::from_value(Value::Object(stored.clone())).unwrap()))
    }
}

#[derive(Default)]
struct Auth {
    current: Mutex<Option<Session>>,
}

#[async_trait]
impl SessionPort for Auth {
    async fn get_session(&self) -> Result<Option<Session>, RemoteError> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<Session, RemoteError> {
        let session = Session::new(UserId::from(format!("uid-{email}")), Some(email.to_string()));
        *self.current.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, RemoteError> {
        self.sign_in(email, password).await.map(Some)
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        *self.current.lock().unwrap() = None;
        Ok(())
    }

    async fn reset_password_for_email(&self, _email: &str, _redirect_to: &str) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn update_password(&self, _new_password: &str) -> Result<(), RemoteError> {
        Ok(())
    }
}

/// Admin table not provisioned yet.
struct MissingAdminTable;

#[async_trait]
impl AdminFlagPort for MissingAdminTable {
    async fn has_admin_row(&self, _user_id: &UserId) -> Result<bool, RemoteError> {
        Err(RemoteError::classify("relation \"public.app_admins\" does not exist"))
    }
}

#[derive(Default)]
struct Bucket {
    objects: Mutex<Vec<String>>,
}

#[async_trait]
impl BlobStoragePort for Bucket {
    async fn list(&self, prefix: &str, _options: &ListOptions) -> Result<Vec<ContentFile>, RemoteError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter_map(|path| path.strip_prefix(&format!("{prefix}/")).map(str::to_string))
            .map(|name| ContentFile {
                name,
                created_at: None,
                size: None,
            })
            .collect())
    }

    async fn upload(&self, path: &str, _bytes: Vec<u8>, _options: &UploadOptions) -> Result<(), RemoteError> {
        self.objects.lock().unwrap().push(path.to_string());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://files.example/{path}")
    }
}

fn app(data_dir: &TempDir) -> GaiaApp {
    GaiaApp::new(AppDeps {
        session: Arc::new(Auth::default()),
        profile_store: Arc::new(Profiles::default()),
        admin_flags: Arc::new(MissingAdminTable),
        blobs: Arc::new(Bucket::default()),
        local_store: Arc::new(FileLocalStore::open(data_dir.path()).unwrap()),
        clock: Arc::new(SystemClock),
        admin_allow_list: AdminAllowList::new(["equipe@gaia.example"]),
        upload_prefix: "uploads".to_string(),
    })
}

fn personal_info() -> PersonalInfoForm {
    PersonalInfoForm {
        full_name: "  Ana Souza ".into(),
        phone: "(11) 98888-7777".into(),
        cpf: "529.982.247-25".into(),
        birth_date: "01/02/1990".into(),
        state: "SP".into(),
    }
}

#[tokio::test]
async fn new_user_walks_onboarding_to_main_app() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let session = app.session().sign_up("ana@example.com", "segredo123").await.unwrap().unwrap();
    let user = session.user_id.clone();

    assert_eq!(app.session().enter_gate().await.navigate_to, Some(Route::PersonalInfo));
    assert_eq!(
        app.session().guard(Route::Products).await,
        GuardOutcome::Redirect(Route::PersonalInfo)
    );

    let next = app.steps().save_personal_info(&user, &personal_info()).await.unwrap();
    assert_eq!(next, Route::PreferencesWizard);
    assert_eq!(app.session().guard(Route::Products).await, GuardOutcome::Render);
    assert_eq!(
        app.session().guard(Route::MainApp).await,
        GuardOutcome::Redirect(Route::PreferencesWizard)
    );

    let preferences = PreferencesForm {
        age_range: Some(AgeRange::From25To34),
        main_goal: Some("Dormir melhor".into()),
        main_reason: Some("Insônia".into()),
    };
    let next = app.steps().save_preferences(&user, &preferences).await.unwrap();
    assert_eq!(next, Route::ConditionsSelection);

    let next = app
        .steps()
        .save_conditions(&user, vec!["Insônia".into(), "Ansiedade".into()])
        .await
        .unwrap();
    assert_eq!(next, Route::MainApp);
    assert_eq!(app.session().guard(Route::MainApp).await, GuardOutcome::Render);
    assert_eq!(app.session().enter_gate().await.navigate_to, Some(Route::MainApp));

    let mut triage = TriageMap::new();
    triage.toggle("fuma");
    let next = app.steps().save_health_triage(&user, triage).await.unwrap();
    assert_eq!(next, Route::EmotionalTriage);
    let profile = app.session().snapshot().await.profile.unwrap();
    assert!(profile.health_triage.get("fuma").is_some_and(|e| e.on));
    assert_eq!(profile.full_name.as_deref(), Some("Ana Souza"));
}

#[tokio::test]
async fn sign_out_returns_to_auth() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    app.session().sign_in("ana@example.com", "segredo123").await.unwrap();

    assert_eq!(app.session().sign_out().await, Some(Route::Auth));
    assert_eq!(app.session().guard(Route::MainApp).await, GuardOutcome::Redirect(Route::Auth));
    assert_eq!(app.session().bootstrap().await, Ok(None));
}

#[tokio::test]
async fn fallback_admin_can_upload_contents() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    app.session().sign_in("equipe@gaia.example", "segredo123").await.unwrap();

    assert!(app.session().snapshot().await.is_admin);
    let url = app.contents().upload_content("Guia CBD.pdf", b"%PDF".to_vec()).await.unwrap();
    assert!(url.starts_with("https://files.example/uploads/"));
    assert!(url.ends_with("-Guia_CBD.pdf"));

    let listed = app.contents().list_contents().await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn cart_round_trips_through_file_store() {
    let dir = TempDir::new().unwrap();
    {
        let app = app(&dir);
        app.cart().add("oleo-cbd", "Óleo CBD", "3%");
        app.cart().add("oleo-cbd", "Óleo CBD", "6%");
    }

    let reopened = app(&dir);
    let cart = reopened.cart().read();
    let ids: Vec<_> = cart.items().iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, ["oleo-cbd-3%", "oleo-cbd-6%"]);

    reopened.cart().write(&Default::default());
    assert!(reopened.cart().read().is_empty());
}
