//! Wire types for the platform REST backend.
//!
//! The backend speaks camelCase JSON; prices are plain JSON numbers, so
//! decimal fields deserialize through `rust_decimal::serde::float`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use quitanda_core::{
    CardId, ClientId, DiscountId, OrderId, OrderStatus, ProductId, RestaurantId,
};

/// A client profile as returned by `GET /client/{id}`.
///
/// Fetched once per session (cached) and refreshed after edits.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub url_image: Option<String>,
    /// Stored payment cards owned by this client.
    #[serde(default)]
    pub cards: Vec<CreditCard>,
}

/// A stored payment card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: CardId,
    pub nickname: String,
    pub owner: String,
    pub card_number: String,
    pub valid_thru: String,
    pub cvv: String,
}

/// Payload for `POST /card`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCreditCard {
    pub client_id: ClientId,
    pub nickname: String,
    pub owner: String,
    /// Digits only; the form's mask dashes are stripped before submission.
    pub card_number: String,
    /// Synthetic full date, always day 28 of the given month/year.
    pub valid_thru: String,
    pub cvv: String,
    /// The backend stores the nickname as the issuing bank as well.
    pub bank: String,
    pub cpf_client: String,
}

/// Payload for `PUT /client/{id}`.
///
/// The password gates the save; the backend performs the actual check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    pub password: String,
}

/// One line of an order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// The cart line's observation, if any.
    pub description: Option<String>,
}

/// Payload for `POST /order`.
///
/// Write-only: assembled at submit time from the cart, the selected card,
/// and the session identity. Never kept after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub client_id: ClientId,
    pub restaurant_id: RestaurantId,
    pub card_id: CardId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<DiscountId>,
    pub observation: Option<String>,
    pub product_list: Vec<OrderLine>,
}

/// An order as listed by `GET /order/client/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub restaurant_name: Option<String>,
}

/// A product as listed by `GET /product`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub restaurant_id: RestaurantId,
    #[serde(rename = "type", default)]
    pub product_type: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub url_image: Option<String>,
}

/// A discount as resolved by `GET /discount/{code}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: DiscountId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Payload for `POST /login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from `POST /login`: the authenticated client's identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: ClientId,
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_profile_from_backend_json() {
        let json = r#"{
            "id": 3,
            "name": "Guilherme Illescas",
            "email": "gui@example.com",
            "cpf": "123.456.789-00",
            "urlImage": "/images/3.png",
            "cards": [
                {
                    "id": 1,
                    "nickname": "Nubank",
                    "owner": "GUILHERME ILLESCAS",
                    "cardNumber": "5162306219378829",
                    "validThru": "28/01/2025",
                    "cvv": "123"
                }
            ]
        }"#;

        let profile: ClientProfile = serde_json::from_str(json).expect("deserialize");
        assert_eq!(profile.id, ClientId::new(3));
        assert_eq!(profile.cards.len(), 1);
        assert_eq!(profile.cards[0].nickname, "Nubank");
    }

    #[test]
    fn test_client_profile_tolerates_missing_optionals() {
        let json = r#"{"id": 3, "name": "A", "email": "a@b.com"}"#;
        let profile: ClientProfile = serde_json::from_str(json).expect("deserialize");
        assert!(profile.cpf.is_none());
        assert!(profile.cards.is_empty());
    }

    #[test]
    fn test_new_order_serializes_camel_case() {
        let order = NewOrder {
            client_id: ClientId::new(3),
            restaurant_id: RestaurantId::new(10),
            card_id: CardId::new(1),
            discount_id: None,
            observation: None,
            product_list: vec![OrderLine {
                product_id: ProductId::new(5),
                quantity: 2,
                description: Some("sem cebola".to_string()),
            }],
        };

        let value = serde_json::to_value(&order).expect("serialize");
        assert_eq!(value["clientId"], 3);
        assert_eq!(value["restaurantId"], 10);
        assert_eq!(value["productList"][0]["productId"], 5);
        assert_eq!(value["productList"][0]["description"], "sem cebola");
        // Absent discount is omitted entirely, not sent as null
        assert!(value.get("discountId").is_none());
    }

    #[test]
    fn test_product_price_from_json_number() {
        let json = r#"{"id": 5, "restaurantId": 10, "name": "X-Salada", "price": 25.5}"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert_eq!(product.price, Decimal::new(2550, 2).normalize());
    }
}
