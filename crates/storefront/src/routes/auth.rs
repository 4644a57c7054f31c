//! Authentication route handlers.
//!
//! Login and registration go through the backend's `/auth/*` endpoints; the
//! returned token is kept in the session, never in the browser.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use souk_api::types::{AuthSession, Registration, SignupRole};
use souk_core::Email;
use souk_core::guard::safe_next;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{clear_current_session, current_token, set_current_session};
use crate::models::session::push_flash;
use crate::models::{Flash, SessionUser};
use crate::state::AppState;
use crate::views::Layout;

/// Minimum password length accepted before calling the backend.
const MIN_PASSWORD_LEN: usize = 8;

const INVALID_EMAIL: &str = "Adresse e-mail invalide.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    pub role: SignupRole,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub shop_name: String,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            password_confirmation: String::new(),
            role: SignupRole::Client,
            phone: String::new(),
            shop_name: String::new(),
        }
    }
}

impl RegisterForm {
    /// Validate locally and build the backend payload.
    fn to_registration(&self) -> std::result::Result<Registration, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Le nom est obligatoire.".to_string());
        }
        let email = Email::parse(&self.email).map_err(|_| INVALID_EMAIL.to_string())?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Le mot de passe doit contenir au moins {MIN_PASSWORD_LEN} caractères."
            ));
        }
        if self.password != self.password_confirmation {
            return Err("Les mots de passe ne correspondent pas.".to_string());
        }
        let shop_name = self.shop_name.trim();
        if self.role == SignupRole::Vendor && shop_name.is_empty() {
            return Err("Le nom de la boutique est obligatoire.".to_string());
        }
        let phone = self.phone.trim();

        Ok(Registration {
            name: name.to_string(),
            email: email.into_inner(),
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
            role: self.role,
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            shop_name: (self.role == SignupRole::Vendor).then(|| shop_name.to_string()),
        })
    }

    /// Form values to render again (passwords are never echoed).
    fn redisplay(self) -> Self {
        Self {
            password: String::new(),
            password_confirmation: String::new(),
            ..self
        }
    }

    #[must_use]
    pub fn role_is(&self, role: &str) -> bool {
        matches!(
            (self.role, role),
            (SignupRole::Client, "client")
                | (SignupRole::Vendor, "vendor")
                | (SignupRole::Partner, "partner")
        )
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
    pub denied: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
    pub denied: bool,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub form: RegisterForm,
    pub error: Option<String>,
}

/// Where to go after signing in.
fn landing(auth: &AuthSession, next: Option<&str>) -> String {
    next.and_then(safe_next).map_or_else(
        || auth.user.role.storefront_home().to_string(),
        ToString::to_string,
    )
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(session: Session, Query(query): Query<LoginQuery>) -> LoginTemplate {
    LoginTemplate {
        layout: Layout::load(&session).await,
        email: String::new(),
        next: query
            .next
            .as_deref()
            .and_then(safe_next)
            .unwrap_or_default()
            .to_string(),
        error: None,
        denied: query.denied.is_some(),
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = form.next.as_deref().filter(|n| !n.is_empty());

    let error = match Email::parse(&form.email) {
        Err(_) => INVALID_EMAIL.to_string(),
        Ok(email) => match state.api().auth().login(&email, &form.password).await {
            Ok(auth) => {
                let user = SessionUser::from(auth.user.clone());
                set_current_session(&session, &auth.token, &user).await?;
                tracing::info!(user_id = %user.id, role = %user.role, "User signed in");
                return Ok(Redirect::to(&landing(&auth, next)).into_response());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                e.user_message()
            }
        },
    };

    Ok(LoginTemplate {
        layout: Layout::load(&session).await,
        email: form.email,
        next: next.and_then(safe_next).unwrap_or_default().to_string(),
        error: Some(error),
        denied: false,
    }
    .into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(session: Session) -> RegisterTemplate {
    RegisterTemplate {
        layout: Layout::load(&session).await,
        form: RegisterForm::default(),
        error: None,
    }
}

/// Handle registration form submission.
///
/// Vendors are created `pending`: they land on the waiting panel.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let error = match form.to_registration() {
        Err(message) => message,
        Ok(registration) => match state.api().auth().register(&registration).await {
            Ok(auth) => {
                let user = SessionUser::from(auth.user.clone());
                set_current_session(&session, &auth.token, &user).await?;
                tracing::info!(user_id = %user.id, role = %user.role, "Account created");
                push_flash(&session, Flash::success("Bienvenue sur Souk !")).await?;
                return Ok(Redirect::to(&landing(&auth, None)).into_response());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Registration failed");
                e.user_message()
            }
        },
    };

    Ok(RegisterTemplate {
        layout: Layout::load(&session).await,
        form: form.redisplay(),
        error: Some(error),
    }
    .into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// The backend token is revoked on a best-effort basis; the session is
/// cleared either way.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Some(token) = current_token(&session).await
        && let Err(e) = state.api().auth().logout(&token).await
    {
        tracing::warn!(error = %e, "Token revocation failed");
    }

    clear_current_session(&session).await?;
    push_flash(&session, Flash::success("Vous êtes déconnecté.")).await?;
    Ok(Redirect::to("/"))
}
