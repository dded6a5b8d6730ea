use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: String,
    pub opening_hours: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub opening_hours: Option<String>,
}

/// One cart line, resolved with current product details for display.
/// `line_subtotal` is `product.price × quantity` as of the last mutation of
/// this line (the original data model called this `unit_price`; it was always
/// a line subtotal and is named accordingly here).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub quantity: i32,
    pub line_subtotal: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub items: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        Self::ALL.iter().copied().find(|st| st.as_str() == s)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    fn next_forward(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Strict adjacency: a transition is either the single next forward step,
    /// or a cancellation of a non-terminal order.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if target == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next_forward() == Some(target)
    }
}

/// Item snapshot taken at checkout; immutable afterwards. The optional product
/// detail is resolved against the current catalog for display and may be gone
/// if the product was deleted since.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub line_subtotal: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    pub total_price: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal owner identity shown on the admin order list.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<OwnerSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for st in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(st.as_str()), Some(st));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"preparing\"");
    }

    #[test]
    fn forward_path_is_strictly_adjacent() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Delivered));

        // no skipping steps, no going backwards
        assert!(!Pending.can_transition_to(Preparing));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Preparing));
    }

    #[test]
    fn cancel_allowed_from_any_non_terminal_state() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Preparing.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        use OrderStatus::*;
        for st in OrderStatus::ALL {
            assert!(!Delivered.can_transition_to(st));
            assert!(!Cancelled.can_transition_to(st));
        }
    }
}
