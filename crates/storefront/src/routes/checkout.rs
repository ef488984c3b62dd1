//! Checkout route handlers.
//!
//! Checkout turns the session cart into an order against the platform
//! backend. The page has two view states, browsing the stored cards and
//! adding a new one; `?add_card=1` toggles the latter. The order payload is
//! assembled only at submit time and nothing about the submission is kept
//! afterwards besides the cleared cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use quitanda_core::{CardId, Cart, ClientId};

use crate::filters;
use crate::forms::{FieldErrors, FormValues, Schema};
use crate::middleware::auth::RequireClient;
use crate::models::CurrentClient;
use crate::platform::types::{CreditCard, NewCreditCard, NewOrder, OrderLine};
use crate::routes::cart::{CartView, load_cart, save_cart};
use crate::state::AppState;

/// Stored card display data.
pub struct CardView {
    pub id: i32,
    pub nickname: String,
    pub last_digits: String,
    pub valid_thru: String,
}

impl From<&CreditCard> for CardView {
    fn from(card: &CreditCard) -> Self {
        let digits: String = card
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let last_digits = if digits.len() >= 4 {
            digits[digits.len() - 4..].to_string()
        } else {
            digits
        };

        Self {
            id: card.id.as_i32(),
            nickname: card.nickname.clone(),
            last_digits,
            valid_thru: card.valid_thru.clone(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub client_name: String,
    pub cart: CartView,
    pub cards: Vec<CardView>,
    pub adding_card: bool,
    pub card_form: NewCardForm,
    pub field_errors: FieldErrors,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Checkout page query parameters.
#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub add_card: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Place order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub card_id: Option<i32>,
    pub observation: Option<String>,
}

/// New card form data; doubles as the template's repopulation source when
/// validation fails.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCardForm {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub valid_thru: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub cpf: String,
}

/// Why an order payload could not be assembled.
#[derive(Debug, PartialEq, Eq)]
pub enum OrderBuildError {
    EmptyCart,
    NoCardSelected,
}

/// Map a flash code from the query string to a user-facing message.
fn flash_message(code: &str) -> &'static str {
    match code {
        "no_card" => "Select a payment card before placing the order",
        "empty_cart" => "Your cart is empty",
        "order_failed" => "Could not place the order. Try again later",
        "card_failed" => "Could not save the card. Try again later",
        "card_added" => "Card saved",
        _ => "Something went wrong. Please try again",
    }
}

/// Assemble the order payload from the cart and the selected card.
///
/// Line observations travel as per-line descriptions; the cart-level
/// discount travels by id only, the backend recomputes the total.
fn build_order(
    client_id: ClientId,
    cart: &Cart,
    card_id: Option<i32>,
    observation: Option<String>,
) -> Result<NewOrder, OrderBuildError> {
    let restaurant_id = cart.restaurant_id().ok_or(OrderBuildError::EmptyCart)?;
    let card_id = card_id
        .map(CardId::new)
        .ok_or(OrderBuildError::NoCardSelected)?;

    let product_list = cart
        .items()
        .iter()
        .map(|item| OrderLine {
            product_id: item.product_id,
            quantity: item.quantity,
            description: item.observation.clone(),
        })
        .collect();

    Ok(NewOrder {
        client_id,
        restaurant_id,
        card_id,
        discount_id: cart.discount().map(|d| d.id),
        observation: observation.filter(|o| !o.trim().is_empty()),
        product_list,
    })
}

/// Expand a short card expiry into the backend's full date format.
///
/// Accepts `"0125"` or `"01/25"` and produces `"28/01/2025"`. Day 28 is
/// synthetic; the backend only cares about month and year.
fn expiry_to_full_date(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 4 {
        return None;
    }

    let month: u32 = digits[..2].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let year: u32 = digits[2..].parse().ok()?;

    Some(format!("28/{month:02}/20{year:02}"))
}

/// Validation schema for the new card form. Presence only; digit validity
/// is the backend's problem.
fn card_schema() -> Schema {
    Schema::new()
        .required("nickname", "Give the card a nickname")
        .required("owner", "The name on the card is required")
        .required("card_number", "The card number is required")
        .required("valid_thru", "The expiry date is required")
        .required("cvv", "The security code is required")
        .required("cpf", "The holder's CPF is required")
}

/// Render the checkout page. Shared by the GET handler and the card-form
/// failure path so inline errors land on a fully populated page.
async fn checkout_page(
    state: &AppState,
    client: &CurrentClient,
    session: &Session,
    adding_card: bool,
    card_form: NewCardForm,
    field_errors: FieldErrors,
    error: Option<&'static str>,
    success: Option<&'static str>,
) -> Response {
    let cart = load_cart(session).await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let cards = match state.platform().get_client(client.id).await {
        Ok(profile) => profile.cards.iter().map(CardView::from).collect(),
        Err(e) => {
            tracing::error!("Failed to load client profile for checkout: {e}");
            Vec::new()
        }
    };

    CheckoutTemplate {
        client_name: client.name.clone(),
        cart: CartView::from(&cart),
        cards,
        adding_card,
        card_form,
        field_errors,
        error,
        success,
    }
    .into_response()
}

/// Display the checkout page.
///
/// Requires a session identity; the stored cards come from the (cached)
/// client profile. An empty cart bounces back to the cart page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
    session: Session,
    Query(query): Query<CheckoutQuery>,
) -> Response {
    checkout_page(
        &state,
        &client,
        &session,
        query.add_card.is_some(),
        NewCardForm::default(),
        FieldErrors::default(),
        query.error.as_deref().map(flash_message),
        query.success.as_deref().map(flash_message),
    )
    .await
}

/// Submit the order.
///
/// On success the cart is cleared and the client lands on their order
/// history. On failure the cart is left untouched so they can retry.
#[instrument(skip(state, session))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
    session: Session,
    Form(form): Form<PlaceOrderForm>,
) -> Response {
    let mut cart = load_cart(&session).await;

    let order = match build_order(client.id, &cart, form.card_id, form.observation) {
        Ok(order) => order,
        Err(OrderBuildError::EmptyCart) => {
            return Redirect::to("/cart?error=empty_cart").into_response();
        }
        Err(OrderBuildError::NoCardSelected) => {
            return Redirect::to("/checkout?error=no_card").into_response();
        }
    };

    if let Err(e) = state.platform().create_order(&order).await {
        tracing::error!("Failed to place order: {e}");
        return Redirect::to("/checkout?error=order_failed").into_response();
    }

    cart.clear();
    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to clear cart after order: {e}");
    }

    Redirect::to("/account/orders?success=order_placed").into_response()
}

/// Store a new payment card on the client's profile.
///
/// Validation failures re-render the page with the form open, the entered
/// values kept, and field errors inline.
#[instrument(skip(state, session, form))]
pub async fn add_card(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
    session: Session,
    Form(form): Form<NewCardForm>,
) -> Response {
    let values = FormValues::new()
        .with("nickname", &form.nickname)
        .with("owner", &form.owner)
        .with("card_number", &form.card_number)
        .with("valid_thru", &form.valid_thru)
        .with("cvv", &form.cvv)
        .with("cpf", &form.cpf);

    let mut field_errors = match card_schema().validate(&values) {
        Ok(()) => FieldErrors::default(),
        Err(errors) => errors,
    };

    let valid_thru = expiry_to_full_date(&form.valid_thru);
    if field_errors.get("valid_thru").is_none() && valid_thru.is_none() {
        field_errors.insert("valid_thru", "Enter the expiry as MM/YY");
    }

    let Some(valid_thru) = valid_thru.filter(|_| field_errors.is_empty()) else {
        return checkout_page(&state, &client, &session, true, form, field_errors, None, None)
            .await;
    };

    let card_number: String = form
        .card_number
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    let card = NewCreditCard {
        client_id: client.id,
        nickname: form.nickname.trim().to_string(),
        owner: form.owner.trim().to_string(),
        card_number,
        valid_thru,
        cvv: form.cvv.trim().to_string(),
        bank: form.nickname.trim().to_string(),
        cpf_client: form.cpf.trim().to_string(),
    };

    if let Err(e) = state.platform().create_card(&card).await {
        tracing::error!("Failed to store card: {e}");
        return Redirect::to("/checkout?error=card_failed").into_response();
    }

    Redirect::to("/checkout?success=card_added").into_response()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use quitanda_core::{AddToCart, DiscountId, ProductId, RestaurantId};

    use super::*;

    fn cart_with_lines() -> Cart {
        let mut cart = Cart::default();
        cart.add(AddToCart {
            product_id: ProductId::new(7),
            restaurant_id: RestaurantId::new(2),
            name: "Feijoada".to_string(),
            unit_price: Decimal::new(4500, 2),
            quantity: 2,
            observation: Some("no pork".to_string()),
        });
        cart.add(AddToCart {
            product_id: ProductId::new(9),
            restaurant_id: RestaurantId::new(2),
            name: "Guarana".to_string(),
            unit_price: Decimal::new(800, 2),
            quantity: 1,
            observation: None,
        });
        cart
    }

    #[test]
    fn test_build_order_maps_cart_lines() {
        let cart = cart_with_lines();
        let order = build_order(ClientId::new(3), &cart, Some(1), None).expect("order");

        assert_eq!(order.client_id, ClientId::new(3));
        assert_eq!(order.restaurant_id, RestaurantId::new(2));
        assert_eq!(order.card_id, CardId::new(1));
        assert_eq!(order.product_list.len(), 2);
        assert_eq!(order.product_list[0].quantity, 2);
        assert_eq!(
            order.product_list[0].description.as_deref(),
            Some("no pork")
        );
        assert!(order.product_list[1].description.is_none());
    }

    #[test]
    fn test_build_order_carries_discount_id() {
        let mut cart = cart_with_lines();
        cart.apply_discount(DiscountId::new(5), Decimal::new(1000, 2));

        let order = build_order(ClientId::new(3), &cart, Some(1), None).expect("order");
        assert_eq!(order.discount_id, Some(DiscountId::new(5)));
    }

    #[test]
    fn test_build_order_without_card_never_yields_payload() {
        let cart = cart_with_lines();
        let err = build_order(ClientId::new(3), &cart, None, None).unwrap_err();
        assert_eq!(err, OrderBuildError::NoCardSelected);
    }

    #[test]
    fn test_build_order_rejects_empty_cart() {
        let cart = Cart::default();
        let err = build_order(ClientId::new(3), &cart, Some(1), None).unwrap_err();
        assert_eq!(err, OrderBuildError::EmptyCart);
    }

    #[test]
    fn test_build_order_blank_observation_dropped() {
        let cart = cart_with_lines();
        let order = build_order(ClientId::new(3), &cart, Some(1), Some("   ".to_string()))
            .expect("order");
        assert!(order.observation.is_none());
    }

    #[test]
    fn test_expiry_accepts_bare_digits() {
        assert_eq!(expiry_to_full_date("0125").as_deref(), Some("28/01/2025"));
    }

    #[test]
    fn test_expiry_accepts_slash_form() {
        assert_eq!(expiry_to_full_date("01/25").as_deref(), Some("28/01/2025"));
        assert_eq!(expiry_to_full_date("12/30").as_deref(), Some("28/12/2030"));
    }

    #[test]
    fn test_expiry_rejects_bad_month() {
        assert!(expiry_to_full_date("1325").is_none());
        assert!(expiry_to_full_date("0025").is_none());
    }

    #[test]
    fn test_expiry_rejects_wrong_length() {
        assert!(expiry_to_full_date("125").is_none());
        assert!(expiry_to_full_date("01255").is_none());
        assert!(expiry_to_full_date("").is_none());
    }

    #[test]
    fn test_card_last_digits() {
        let card = CreditCard {
            id: CardId::new(1),
            nickname: "Nubank".to_string(),
            owner: "GUILHERME".to_string(),
            card_number: "5162-3062-1937-8829".to_string(),
            valid_thru: "28/01/2025".to_string(),
            cvv: "123".to_string(),
        };
        assert_eq!(CardView::from(&card).last_digits, "8829");
    }
}
