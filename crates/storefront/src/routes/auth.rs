//! Session identity handlers.
//!
//! Sign-up and password management live on the platform; the storefront
//! only exchanges credentials for an identity and keeps it in the session.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{clear_current_client, set_current_client};
use crate::models::CurrentClient;
use crate::platform::PlatformError;
use crate::state::AppState;

/// Sign-in request body.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Exchange credentials for a session identity.
///
/// Returns the signed-in client's identity as JSON. Bad credentials get a
/// 401 without detail; the platform logs the specifics.
#[instrument(skip(state, session, body))]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SignInRequest>,
) -> Response {
    let email = body.email.trim();
    if email.is_empty() || body.password.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let login = match state.platform().login(email, &body.password).await {
        Ok(login) => login,
        Err(PlatformError::InvalidCredentials) => {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Err(e) => {
            tracing::error!("Sign-in failed against the platform: {e}");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    let client = CurrentClient {
        id: login.id,
        name: login.name,
        email: login.email,
    };

    if let Err(e) = set_current_client(&session, &client).await {
        tracing::error!("Failed to store session identity: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    set_sentry_user(&client.id.as_i32(), Some(&client.email));
    tracing::info!(client_id = client.id.as_i32(), "client signed in");

    Json(client).into_response()
}

/// Clear the session identity and destroy the session.
///
/// The cart goes with the session; a signed-out browser starts fresh.
#[instrument(skip(session))]
pub async fn sign_out(session: Session) -> Response {
    if let Err(e) = clear_current_client(&session).await {
        tracing::error!("Failed to clear session identity: {e}");
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    clear_sentry_user();

    StatusCode::NO_CONTENT.into_response()
}
