//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session and is re-saved after each mutation;
//! add-to-cart snapshots the product from the platform backend so the cart
//! never trusts a price posted by the browser.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use quitanda_core::{AddToCart, Cart, CartItem, CartItemId, ProductId};

use crate::error::AppError;
use crate::filters;
use crate::models::session_keys;
use crate::platform::PlatformError;
use crate::routes::MessageQuery;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i32,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_price: Decimal,
    pub observation: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub has_discount: bool,
    pub total: Decimal,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal(),
            discount: cart.discount_amount(),
            has_discount: cart.discount().is_some(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.as_i32(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_price: item.line_price(),
            observation: item.observation.clone(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session, defaulting to empty.
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Save the cart back to the session.
pub async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub quantity: Option<u32>,
    pub observation: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: i32,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: i32,
}

/// Discount code form data.
#[derive(Debug, Deserialize)]
pub struct DiscountForm {
    pub code: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Map a flash code from the query string to a user-facing message.
fn flash_message(code: &str) -> &'static str {
    match code {
        "empty_cart" => "Your cart is empty",
        "invalid_code" => "This discount code does not exist",
        "discount_failed" => "Could not apply the discount. Try again later",
        "discount_applied" => "Discount applied to your cart",
        _ => "Something went wrong. Please try again",
    }
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<CartShowTemplate, AppError> {
    let cart = session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default();

    Ok(CartShowTemplate {
        cart: CartView::from(&cart),
        error: query.error.as_deref().map(flash_message),
        success: query.success.as_deref().map(flash_message),
    })
}

/// Add item to cart (HTMX).
///
/// Fetches the product from the platform backend and snapshots its name and
/// price into the cart line. Returns the count badge with an HTMX trigger so
/// other cart elements refresh.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let product = match state
        .platform()
        .get_product(ProductId::new(form.product_id))
        .await
    {
        Ok(product) => product,
        Err(e) => {
            tracing::error!("Failed to fetch product for add-to-cart: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<span class=\"error\">Error adding to cart</span>"),
            )
                .into_response();
        }
    };

    let mut cart = load_cart(&session).await;
    cart.add(AddToCart {
        product_id: product.id,
        restaurant_id: product.restaurant_id,
        name: product.name,
        unit_price: product.price,
        quantity: form.quantity.unwrap_or(1),
        observation: form.observation.filter(|o| !o.trim().is_empty()),
    });

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<span class=\"error\">Error adding to cart</span>"),
        )
            .into_response();
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response()
}

/// Update cart item quantity (HTMX). Quantity zero removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    let mut cart = load_cart(&session).await;

    if !cart.update_quantity(CartItemId::new(form.item_id), form.quantity) {
        tracing::warn!("Update for unknown cart line {}", form.item_id);
    }

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Remove item from cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    let mut cart = load_cart(&session).await;

    if !cart.remove(CartItemId::new(form.item_id)) {
        tracing::warn!("Remove for unknown cart line {}", form.item_id);
    }

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    CartCountTemplate {
        count: cart.item_count(),
    }
}

/// Apply a discount code to the cart.
///
/// Resolves the code against the platform backend and stores the resulting
/// `{id, amount}` on the cart.
#[instrument(skip(state, session))]
pub async fn discount(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DiscountForm>,
) -> Response {
    let code = form.code.trim();
    if code.is_empty() {
        return Redirect::to("/cart?error=invalid_code").into_response();
    }

    match state.platform().get_discount(code).await {
        Ok(discount) => {
            let mut cart = load_cart(&session).await;
            cart.apply_discount(discount.id, discount.amount);

            if let Err(e) = save_cart(&session, &cart).await {
                tracing::error!("Failed to save cart to session: {e}");
                return Redirect::to("/cart?error=discount_failed").into_response();
            }

            Redirect::to("/cart?success=discount_applied").into_response()
        }
        Err(PlatformError::NotFound(_)) => {
            Redirect::to("/cart?error=invalid_code").into_response()
        }
        Err(e) => {
            tracing::error!("Failed to resolve discount code: {e}");
            Redirect::to("/cart?error=discount_failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_codes_map_to_messages() {
        // Checkout bounces an empty cart back here with this code.
        assert_eq!(flash_message("empty_cart"), "Your cart is empty");
        assert_eq!(flash_message("invalid_code"), "This discount code does not exist");
        assert_eq!(flash_message("discount_applied"), "Discount applied to your cart");
    }

    #[test]
    fn test_unknown_flash_code_falls_back() {
        assert_eq!(
            flash_message("not-a-code"),
            "Something went wrong. Please try again"
        );
    }
}
