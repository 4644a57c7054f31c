//! Authentication extractors for the protected areas.
//!
//! [`RequireArea<A>`] is the only gate in front of the vendor dashboard, the
//! partner portal and the customer account. It resolves the session against
//! `GET /auth/me` exactly once per request, hands the result to
//! [`souk_core::guard::decide`] and applies the outcome.

use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, OriginalUri, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use souk_api::ApiToken;
use souk_core::guard::{self, Area, GuardOutcome, SessionResolution};
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::error::{SessionExpired, clear_sentry_user, set_sentry_user};
use crate::models::{SessionUser, session_keys};
use crate::state::AppState;

/// Extractor admitting only users holding `A::ROLE`.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(auth: RequireArea<PartnerArea>) -> impl IntoResponse {
///     format!("Hello, {}!", auth.user.name)
/// }
/// ```
pub struct RequireArea<A: Area> {
    /// Freshly resolved user.
    pub user: SessionUser,
    /// Token to call the backend with.
    pub token: ApiToken,
    _area: PhantomData<A>,
}

/// Error returned when the guard does not admit the request.
#[derive(Debug)]
pub enum AreaRejection {
    /// Redirect to the area entry, or to the user's own home.
    Redirect(String),
    /// No session layer in front of the handler.
    Unauthorized,
}

impl IntoResponse for AreaRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(to) => Redirect::to(&to).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<A: Area> FromRequestParts<AppState> for RequireArea<A> {
    type Rejection = AreaRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AreaRejection::Unauthorized)?;

        let original = requested_path(parts);

        let token = current_token(&session).await;
        let (resolution, user) = match &token {
            None => (SessionResolution::NoToken, None),
            Some(token) => match state.api().auth().me(token).await {
                Ok(user) => (SessionResolution::Resolved(user.role), Some(user)),
                Err(e) => {
                    warn!(area = A::LABEL, error = %e, "Session token rejected");
                    (SessionResolution::Rejected, None)
                }
            },
        };

        match guard::decide::<A>(resolution) {
            GuardOutcome::Allow => {
                let (Some(token), Some(user)) = (token, user) else {
                    return Err(AreaRejection::Unauthorized);
                };
                let user = SessionUser::from(user);
                // Keep the cached copy in step with the backend; an unchanged
                // copy is not rewritten so the session stays unmodified.
                let cached = session
                    .get::<SessionUser>(session_keys::CURRENT_USER)
                    .await
                    .ok()
                    .flatten();
                if cached.as_ref() != Some(&user)
                    && let Err(e) = session.insert(session_keys::CURRENT_USER, &user).await
                {
                    warn!(error = %e, "Failed to refresh cached user");
                }
                set_sentry_user(&user.id, Some(&user.email));

                Ok(Self {
                    user,
                    token,
                    _area: PhantomData,
                })
            }
            GuardOutcome::RedirectToEntry => {
                debug!(area = A::LABEL, "No session token");
                Err(AreaRejection::Redirect(guard::entry_with_next::<A>(
                    &original,
                )))
            }
            GuardOutcome::ClearAndRedirect => {
                if let Err(e) = clear_current_session(&session).await {
                    warn!(error = %e, "Failed to clear rejected session");
                }
                Err(AreaRejection::Redirect(guard::entry_with_next::<A>(
                    &original,
                )))
            }
            GuardOutcome::RedirectAway(home) => {
                debug!(area = A::LABEL, home, "Role does not match area");
                Err(AreaRejection::Redirect(home.to_string()))
            }
        }
    }
}

/// Extractor that optionally gets the cached user, for navigation.
///
/// Does not call the backend; protected pages use [`RequireArea`].
pub struct CurrentUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<SessionUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
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

/// Helper to store a fresh login in the session.
///
/// The session ID is rotated first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_session(
    session: &Session,
    token: &ApiToken,
    user: &SessionUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::API_TOKEN, token).await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    set_sentry_user(&user.id, Some(&user.email));
    Ok(())
}

/// Helper to clear the credentials from the session (logout, rejected token).
///
/// The cart survives; everything tied to the account does not.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_session(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.remove::<ApiToken>(session_keys::API_TOKEN).await?;
    session
        .remove::<SessionUser>(session_keys::CURRENT_USER)
        .await?;
    session
        .remove::<serde_json::Value>(session_keys::PAYMENT_CODE_PANEL)
        .await?;
    clear_sentry_user();
    Ok(())
}

/// Clear the credentials when a handler met a backend `401`.
///
/// Runs inside the session layer so the cleared record is what gets saved.
pub async fn end_expired_session(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.extensions().get::<SessionExpired>().is_some() {
        warn!("Backend rejected the session token mid-request");
        if let Err(e) = clear_current_session(&session).await {
            warn!(error = %e, "Failed to clear expired session");
        }
    }
    response
}
