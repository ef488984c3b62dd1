//! Status enums for platform entities.

use serde::{Deserialize, Serialize};

/// Lifecycle of an order as reported by the platform backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Submitted, awaiting restaurant confirmation.
    #[default]
    Placed,
    /// Accepted and being prepared.
    Preparing,
    /// Out for delivery.
    Delivering,
    /// Delivered to the client.
    Delivered,
    /// Canceled by the client or the restaurant.
    Canceled,
}

impl OrderStatus {
    /// Human-readable label for the order history view.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Placed => "Placed",
            Self::Preparing => "Preparing",
            Self::Delivering => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Canceled => "Canceled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Delivering).expect("serialize");
        assert_eq!(json, "\"DELIVERING\"");
        let back: OrderStatus = serde_json::from_str("\"CANCELED\"").expect("deserialize");
        assert_eq!(back, OrderStatus::Canceled);
    }

    #[test]
    fn test_default_is_placed() {
        assert_eq!(OrderStatus::default(), OrderStatus::Placed);
    }
}
