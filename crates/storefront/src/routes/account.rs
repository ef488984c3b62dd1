//! Account route handlers.
//!
//! The profile page is read-only by default and switches to an editable form
//! with `?edit=1`. Saving requires the current password; the platform backend
//! performs the actual check, the storefront only refuses blank input.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::forms::{FieldErrors, FormValues, Schema};
use crate::middleware::auth::{RequireClient, set_current_client};
use crate::models::CurrentClient;
use crate::platform::types::ClientUpdate;
use crate::routes::MessageQuery;
use crate::state::AppState;

/// Profile page query parameters.
#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub edit: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/show.html")]
pub struct ProfileTemplate {
    pub editing: bool,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub cpf: String,
    pub image_url: Option<String>,
    pub field_errors: FieldErrors,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Order history entry display data.
pub struct OrderView {
    pub id: i32,
    pub status: &'static str,
    pub total: Decimal,
    pub restaurant_name: Option<String>,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderView>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Profile edit form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub password: String,
}

/// Map a flash code from the query string to a user-facing message.
fn flash_message(code: &str) -> &'static str {
    match code {
        "save_failed" => "Could not save your profile. Try again later",
        "profile_saved" => "Profile updated",
        "upload_failed" => "Could not upload the image. Try again later",
        "image_saved" => "Profile picture updated",
        "order_placed" => "Order placed. Track its status here",
        "orders_failed" => "Could not load your orders. Try again later",
        _ => "Something went wrong. Please try again",
    }
}

/// Split a full name into (first, rest) for the edit form.
fn split_name(full: &str) -> (String, String) {
    match full.trim().split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (full.trim().to_string(), String::new()),
    }
}

/// Join the form's name halves back into the backend's single name field.
fn join_name(first: &str, last: &str) -> String {
    let first = first.trim();
    let last = last.trim();
    if last.is_empty() {
        first.to_string()
    } else {
        format!("{first} {last}")
    }
}

/// Validation schema for the profile form.
///
/// The password rule is what gates the save; everything else mirrors the
/// required fields of the platform's client record.
fn profile_schema() -> Schema {
    Schema::new()
        .required("first_name", "Your first name is required")
        .required("last_name", "Your last name is required")
        .required("email", "Your email is required")
        .email("email", "Enter a valid email address")
        .required("password", "Enter your password to save changes")
}

/// Display the profile page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
    Query(query): Query<ProfileQuery>,
) -> crate::error::Result<ProfileTemplate> {
    let profile = state.platform().get_client(client.id).await?;

    let (first_name, last_name) = split_name(&profile.name);

    Ok(ProfileTemplate {
        editing: query.edit.is_some(),
        first_name,
        last_name,
        email: profile.email,
        cpf: profile.cpf.unwrap_or_default(),
        image_url: profile.url_image,
        field_errors: FieldErrors::default(),
        error: query.error.as_deref().map(flash_message),
        success: query.success.as_deref().map(flash_message),
    })
}

/// Save profile edits.
///
/// On success the session identity is refreshed so the header greets the
/// client by their new name immediately.
#[instrument(skip(state, session, form))]
pub async fn save(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Response {
    let values = FormValues::new()
        .with("first_name", &form.first_name)
        .with("last_name", &form.last_name)
        .with("email", &form.email)
        .with("password", &form.password);

    if let Err(field_errors) = profile_schema().validate(&values) {
        // Re-render the form with the entered values and inline errors;
        // the picture still comes from the (cached) profile.
        let image_url = state
            .platform()
            .get_client(client.id)
            .await
            .ok()
            .and_then(|profile| profile.url_image);

        return ProfileTemplate {
            editing: true,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            cpf: form.cpf,
            image_url,
            field_errors,
            error: None,
            success: None,
        }
        .into_response();
    }

    let name = join_name(&form.first_name, &form.last_name);
    let email = form.email.trim().to_string();
    let cpf = Some(form.cpf.trim().to_string()).filter(|c| !c.is_empty());

    let update = ClientUpdate {
        name: name.clone(),
        email: email.clone(),
        cpf,
        password: form.password,
    };

    if let Err(e) = state.platform().update_client(client.id, &update).await {
        tracing::error!("Failed to save client profile: {e}");
        return Redirect::to("/account?edit=1&error=save_failed").into_response();
    }

    let refreshed = CurrentClient {
        id: client.id,
        name,
        email,
    };
    if let Err(e) = set_current_client(&session, &refreshed).await {
        tracing::error!("Failed to refresh session identity: {e}");
    }

    Redirect::to("/account?success=profile_saved").into_response()
}

/// Upload a new profile picture.
///
/// Reads the first `image` part of the multipart body and forwards it to
/// the platform's upload endpoint together with the client id.
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
    mut multipart: Multipart,
) -> Response {
    let mut image: Option<(String, String, Vec<u8>)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            let file_name = field
                .file_name()
                .unwrap_or("profile.png")
                .to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            match field.bytes().await {
                Ok(bytes) => image = Some((file_name, content_type, bytes.to_vec())),
                Err(e) => {
                    tracing::error!("Failed to read image upload: {e}");
                }
            }
            break;
        }
    }

    let Some((file_name, content_type, bytes)) = image else {
        return Redirect::to("/account?error=upload_failed").into_response();
    };

    if bytes.is_empty() {
        return Redirect::to("/account?error=upload_failed").into_response();
    }

    if let Err(e) = state
        .platform()
        .upload_image(client.id, file_name, content_type, bytes)
        .await
    {
        tracing::error!("Failed to upload profile image: {e}");
        return Redirect::to("/account?error=upload_failed").into_response();
    }

    Redirect::to("/account?success=image_saved").into_response()
}

/// Display the order history.
#[instrument(skip(state))]
pub async fn orders(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
    Query(query): Query<MessageQuery>,
) -> Response {
    let (orders, error) = match state.platform().client_orders(client.id).await {
        Ok(summaries) => {
            let views = summaries
                .into_iter()
                .map(|order| OrderView {
                    id: order.id.as_i32(),
                    status: order.status.label(),
                    total: order.total,
                    restaurant_name: order.restaurant_name,
                })
                .collect();
            (views, query.error.as_deref().map(flash_message))
        }
        Err(e) => {
            tracing::error!("Failed to load order history: {e}");
            (Vec::new(), Some(flash_message("orders_failed")))
        }
    };

    OrdersTemplate {
        orders,
        error,
        success: query.success.as_deref().map(flash_message),
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name_two_parts() {
        let (first, last) = split_name("Guilherme Illescas");
        assert_eq!(first, "Guilherme");
        assert_eq!(last, "Illescas");
    }

    #[test]
    fn test_split_name_single_word() {
        let (first, last) = split_name("Guilherme");
        assert_eq!(first, "Guilherme");
        assert!(last.is_empty());
    }

    #[test]
    fn test_split_name_keeps_middle_names_in_last() {
        let (first, last) = split_name("Ana Maria da Silva");
        assert_eq!(first, "Ana");
        assert_eq!(last, "Maria da Silva");
    }

    #[test]
    fn test_join_name_round_trips() {
        assert_eq!(join_name("Guilherme", "Illescas"), "Guilherme Illescas");
        assert_eq!(join_name("Guilherme", ""), "Guilherme");
        assert_eq!(join_name(" Ana ", " da Silva "), "Ana da Silva");
    }

    #[test]
    fn test_profile_schema_requires_password() {
        let values = FormValues::new()
            .with("first_name", "Ana")
            .with("email", "ana@example.com")
            .with("password", "");

        let errors = profile_schema().validate(&values).unwrap_err();
        assert!(errors.get("password").is_some());
        assert!(errors.get("email").is_none());
    }
}
