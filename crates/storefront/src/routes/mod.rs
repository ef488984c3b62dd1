//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the menu
//! GET  /health                 - Health check
//!
//! # Menu
//! GET  /menu                   - Product listing
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/discount          - Apply a discount code (redirect with flash)
//!
//! # Checkout (requires session identity)
//! GET  /checkout               - Stored cards + order summary (?add_card=1 for the card form)
//! POST /checkout               - Submit the order
//! POST /checkout/cards         - Store a new payment card
//!
//! # Account (requires session identity)
//! GET  /account                - Profile (read-only; ?edit=1 for edit mode)
//! POST /account                - Save profile edits (password-gated)
//! POST /account/image          - Profile image upload (multipart)
//! GET  /account/orders         - Order history
//!
//! # Session identity (JSON, installed by the platform auth flow)
//! POST /auth/session           - Sign in (credentials -> session identity)
//! POST /auth/logout            - Clear the session identity
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod menu;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Query parameters for flash display on redirects.
///
/// Flashes travel as short codes (`?error=no_card`) and are mapped to
/// user-facing messages at render time by each route module.
#[derive(Debug, serde::Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .route("/discount", post(cart::discount))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place_order))
        .route("/cards", post(checkout::add_card))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::show).post(account::save))
        .route("/image", post(account::upload_image))
        .route("/orders", get(account::orders))
}

/// Create the session identity routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(auth::sign_in))
        .route("/logout", post(auth::sign_out))
}

/// The storefront has no landing page of its own; the menu is the front door.
async fn root() -> Redirect {
    Redirect::to("/menu")
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/menu", get(menu::index))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
}
