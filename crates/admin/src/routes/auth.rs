//! Authentication route handlers.
//!
//! Administrators sign in with their Souk backend account. Accounts holding
//! any other role are refused and their fresh token is revoked.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use souk_core::guard::safe_next;
use souk_core::{Email, Role};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{clear_current_admin, current_token, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;
use crate::views::Layout;

const NOT_AN_ADMIN: &str = "Ce compte n'a pas accès à la console d'administration.";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Query parameters of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
    pub denied: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
}

fn local_next(next: Option<&str>) -> String {
    next.and_then(safe_next).unwrap_or_default().to_string()
}

/// Display the login page.
///
/// `?denied` is set by the guard when a non-admin session reached the console.
pub async fn login_page(session: Session, Query(query): Query<LoginQuery>) -> LoginTemplate {
    LoginTemplate {
        layout: Layout::load(&session).await,
        email: String::new(),
        next: local_next(query.next.as_deref()),
        error: query.denied.is_some().then(|| NOT_AN_ADMIN.to_string()),
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = local_next(form.next.as_deref());

    let error = match Email::parse(&form.email) {
        Err(_) => "Adresse e-mail invalide.".to_string(),
        Ok(email) => match state.api().auth().login(&email, &form.password).await {
            Ok(auth) if auth.user.role == Role::Admin => {
                let admin = CurrentAdmin::from(auth.user);
                set_current_admin(&session, &auth.token, &admin).await?;
                tracing::info!(admin_id = %admin.id, "Administrator signed in");
                let to = if next.is_empty() { "/" } else { next.as_str() };
                return Ok(Redirect::to(to).into_response());
            }
            Ok(auth) => {
                tracing::warn!(user_id = %auth.user.id, role = %auth.user.role, "Non-admin login refused");
                if let Err(e) = state.api().auth().logout(&auth.token).await {
                    tracing::warn!(error = %e, "Token revocation failed");
                }
                NOT_AN_ADMIN.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Admin login failed");
                e.user_message()
            }
        },
    };

    Ok(LoginTemplate {
        layout: Layout::load(&session).await,
        email: form.email,
        next,
        error: Some(error),
    }
    .into_response())
}

/// Handle logout.
///
/// The backend token is revoked on a best-effort basis; the session is
/// destroyed either way.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Some(token) = current_token(&session).await
        && let Err(e) = state.api().auth().logout(&token).await
    {
        tracing::warn!(error = %e, "Token revocation failed");
    }

    clear_current_admin(&session).await?;
    Ok(Redirect::to("/auth/login"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_next_only() {
        assert_eq!(local_next(Some("/vendors?status=pending")), "/vendors?status=pending");
        assert_eq!(local_next(Some("https://evil.example/")), "");
        assert_eq!(local_next(Some("//evil.example")), "");
        assert_eq!(local_next(None), "");
    }
}
