//! Session identity extractors.
//!
//! Authentication itself is the platform's concern; the storefront only
//! keeps the signed-in client's identity in the session. These extractors
//! read it back for handlers that need it.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentClient, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in client.
///
/// Page requests without an identity are redirected to the platform login
/// URL; API requests get a bare 401.
///
/// ```rust,ignore
/// async fn checkout(RequireClient(client): RequireClient) -> impl IntoResponse {
///     format!("Checking out as {}", client.name)
/// }
/// ```
pub struct RequireClient(pub CurrentClient);

/// Rejection for [`RequireClient`].
pub enum AuthRejection {
    /// Redirect to the platform login page (for HTML requests).
    RedirectToLogin(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(login_url) => Redirect::to(&login_url).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let client: CurrentClient = session
            .get(session_keys::CURRENT_CLIENT)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if parts.uri.path().starts_with("/auth/") {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin(state.config().platform.login_url.clone())
                }
            })?;

        Ok(Self(client))
    }
}

/// Extractor that optionally reads the signed-in client.
///
/// Unlike [`RequireClient`], this never rejects the request.
pub struct OptionalClient(pub Option<CurrentClient>);

impl<S> FromRequestParts<S> for OptionalClient
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let client = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentClient>(session_keys::CURRENT_CLIENT)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(client))
    }
}

/// Helper to install the client identity in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_client(
    session: &Session,
    client: &CurrentClient,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_CLIENT, client).await
}

/// Helper to clear the client identity from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_client(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentClient>(session_keys::CURRENT_CLIENT)
        .await?;
    Ok(())
}
