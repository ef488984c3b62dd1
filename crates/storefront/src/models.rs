//! Session-stored types.

use serde::{Deserialize, Serialize};

use quitanda_core::ClientId;

/// Session-stored client identity.
///
/// Minimal data kept in the session to identify the signed-in client; the
/// full profile always comes from the platform backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentClient {
    /// Platform client ID.
    pub id: ClientId,
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
}

/// Session keys for storefront state.
pub mod session_keys {
    /// Key for the signed-in client identity.
    pub const CURRENT_CLIENT: &str = "current_client";

    /// Key for the visitor's cart.
    pub const CART: &str = "cart";
}
