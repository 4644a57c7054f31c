//! Authentication middleware and extractors for admin.
//!
//! Every console handler takes [`RequireAdminAuth`]. The extractor resolves
//! the stored token against `GET /auth/me` and lets
//! [`souk_core::guard::decide`] pick the outcome for [`AdminArea`].

use axum::{
    extract::{FromRequestParts, OriginalUri, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use souk_api::ApiToken;
use souk_core::AdminArea;
use souk_core::guard::{self, GuardOutcome, SessionResolution};
use tower_sessions::Session;

use crate::error::{SessionExpired, clear_sentry_user, set_sentry_user};
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in administrator.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(auth: RequireAdminAuth) -> impl IntoResponse {
///     format!("Hello, {}!", auth.admin.name)
/// }
/// ```
pub struct RequireAdminAuth {
    pub admin: CurrentAdmin,
    pub token: ApiToken,
}

/// Error returned when the request is not admitted.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to the login page, or to the denied notice.
    Redirect(String),
    /// No session layer in front of the handler.
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(to) => Redirect::to(&to).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let original = requested_path(parts);

        let token = current_token(&session).await;
        let (resolution, user) = match &token {
            None => (SessionResolution::NoToken, None),
            Some(token) => match state.api().auth().me(token).await {
                Ok(user) => (SessionResolution::Resolved(user.role), Some(user)),
                Err(e) => {
                    tracing::warn!(error = %e, "Admin token rejected");
                    (SessionResolution::Rejected, None)
                }
            },
        };

        match guard::decide::<AdminArea>(resolution) {
            GuardOutcome::Allow => {
                let (Some(token), Some(user)) = (token, user) else {
                    return Err(AdminAuthRejection::Unauthorized);
                };
                let admin = CurrentAdmin::from(user);
                let cached = session
                    .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                    .await
                    .ok()
                    .flatten();
                if cached.as_ref() != Some(&admin)
                    && let Err(e) = session.insert(session_keys::CURRENT_ADMIN, &admin).await
                {
                    tracing::warn!(error = %e, "Failed to refresh cached admin");
                }
                set_sentry_user(&admin.id, Some(&admin.email));
                Ok(Self { admin, token })
            }
            GuardOutcome::RedirectToEntry => Err(AdminAuthRejection::Redirect(
                guard::entry_with_next::<AdminArea>(&original),
            )),
            GuardOutcome::ClearAndRedirect => {
                if let Err(e) = clear_current_admin(&session).await {
                    tracing::warn!(error = %e, "Failed to clear rejected session");
                }
                Err(AdminAuthRejection::Redirect(
                    guard::entry_with_next::<AdminArea>(&original),
                ))
            }
            GuardOutcome::RedirectAway(to) => {
                tracing::info!(path = %original, "Non-admin account refused");
                Err(AdminAuthRejection::Redirect(to.to_string()))
            }
        }
    }
}

/// Path and query the client asked for, before any `nest` prefix was stripped.
fn requested_path(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);
    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string)
}

/// Token stored in the session, if any.
pub async fn current_token(session: &Session) -> Option<ApiToken> {
    session
        .get::<ApiToken>(session_keys::API_TOKEN)
        .await
        .ok()
        .flatten()
}

/// Store a fresh login, rotating the session ID first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    token: &ApiToken,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::API_TOKEN, token).await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await?;
    set_sentry_user(&admin.id, Some(&admin.email));
    Ok(())
}

/// Drop everything tied to the signed-in administrator.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await?;
    clear_sentry_user();
    Ok(())
}

/// Clear the credentials when a handler met a backend `401`.
///
/// Runs inside the session layer so the cleared record is what gets saved.
pub async fn end_expired_session(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.extensions().get::<SessionExpired>().is_some() {
        tracing::warn!("Backend rejected the session token mid-request");
        if let Err(e) = clear_current_admin(&session).await {
            tracing::warn!(error = %e, "Failed to clear expired session");
        }
    }
    response
}
