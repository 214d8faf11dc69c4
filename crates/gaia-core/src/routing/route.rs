use serde::{Deserialize, Serialize};

/// Navigable routes of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Auth,
    Login,
    SignUp,
    Start,
    PersonalInfo,
    PreferencesWizard,
    ConditionsSelection,
    MainApp,
    Profile,
    HealthTriage,
    EmotionalTriage,
    EmotionalSymptoms,
    Products,
    Cart,
    Payments,
    Contents,
    AdminContents,
    Doctors,
    Prescriptions,
    Orders,
    UsageAlerts,
    History,
}

/// How a route decides whether to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    /// Signed-in users are sent to the profile gate.
    PublicOnly,
    RequireAuth,
    /// Personal data must be complete.
    RequireBasicProfile,
    RequireProfileComplete,
    RequireAdmin,
    /// Onboarding step page with its own forward/backward rules.
    Step,
}

impl Route {
    pub const ALL: [Route; 22] = [
        Route::Auth,
        Route::Login,
        Route::SignUp,
        Route::Start,
        Route::PersonalInfo,
        Route::PreferencesWizard,
        Route::ConditionsSelection,
        Route::MainApp,
        Route::Profile,
        Route::HealthTriage,
        Route::EmotionalTriage,
        Route::EmotionalSymptoms,
        Route::Products,
        Route::Cart,
        Route::Payments,
        Route::Contents,
        Route::AdminContents,
        Route::Doctors,
        Route::Prescriptions,
        Route::Orders,
        Route::UsageAlerts,
        Route::History,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Auth => "/auth",
            Route::Login => "/login",
            Route::SignUp => "/criar-conta",
            Route::Start => "/start",
            Route::PersonalInfo => "/perfil-clinico",
            Route::PreferencesWizard => "/wizard",
            Route::ConditionsSelection => "/patologias",
            Route::MainApp => "/app",
            Route::Profile => "/app/perfil",
            Route::HealthTriage => "/app/saude",
            Route::EmotionalTriage => "/app/emocional",
            Route::EmotionalSymptoms => "/app/emocional/sintomas",
            Route::Products => "/app/produtos",
            Route::Cart => "/app/carrinho",
            Route::Payments => "/app/pagamentos",
            Route::Contents => "/app/conteudos",
            Route::AdminContents => "/app/admin/conteudos",
            Route::Doctors => "/app/medicos",
            Route::Prescriptions => "/app/receitas",
            Route::Orders => "/app/pedidos",
            Route::UsageAlerts => "/app/alertas",
            Route::History => "/app/historico",
        }
    }

    /// Resolves a path; trailing slashes are ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        Route::ALL.into_iter().find(|r| r.path() == trimmed)
    }

    /// Target for the root path and for unknown paths.
    pub fn fallback(signed_in: bool) -> Route {
        if signed_in {
            Route::Start
        } else {
            Route::Auth
        }
    }

    pub fn guard(&self) -> GuardKind {
        match self {
            Route::Auth | Route::Login | Route::SignUp => GuardKind::PublicOnly,
            Route::Start => GuardKind::RequireAuth,
            Route::PersonalInfo | Route::PreferencesWizard | Route::ConditionsSelection => {
                GuardKind::Step
            }
            Route::AdminContents => GuardKind::RequireAdmin,
            Route::Products | Route::Cart | Route::Payments | Route::Contents => {
                GuardKind::RequireBasicProfile
            }
            _ => GuardKind::RequireProfileComplete,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
