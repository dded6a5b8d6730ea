use std::sync::Arc;

use uuid::Uuid;

use crate::cart_store::CartStore;
use crate::error::AppError;
use crate::models::{AdminOrder, Order, OrderStatus};
use crate::order_store::{NewOrderItem, OrderStore};

/// Converts a customer's cart into a durable order and manages the status
/// lifecycle. Role checks belong to the HTTP boundary; this service only
/// enforces ownership and state rules.
pub struct OrderService {
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(carts: Arc<dyn CartStore>, orders: Arc<dyn OrderStore>) -> Self {
        Self { carts, orders }
    }

    /// Checkout. Snapshots every cart line verbatim (the cart's last-known
    /// subtotal is trusted, no recomputation), sums the subtotals into the
    /// order total, and clears the cart in the same storage transaction as
    /// the insert.
    pub async fn create_order(
        &self,
        customer_id: Uuid,
        notes: Option<String>,
    ) -> Result<Order, AppError> {
        let cart = self.carts.find(customer_id).await?;
        let cart = match cart {
            Some(cart) if !cart.items.is_empty() => cart,
            _ => {
                return Err(AppError::InvalidState(
                    "Cart is empty. Add items before placing order.".into(),
                ))
            }
        };

        let items: Vec<NewOrderItem> = cart
            .items
            .iter()
            .map(|line| NewOrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
                line_subtotal: line.line_subtotal,
            })
            .collect();
        let total_price: f64 = items.iter().map(|item| item.line_subtotal).sum();

        self.orders
            .create(customer_id, items, total_price, notes)
            .await
    }

    pub async fn my_orders(&self, customer_id: Uuid) -> Result<Vec<Order>, AppError> {
        self.orders.list_for_customer(customer_id).await
    }

    pub async fn order_by_id(&self, customer_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
        let order = self
            .orders
            .find(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

        if order.customer_id != customer_id {
            return Err(AppError::Forbidden(
                "Access denied. This is not your order.".into(),
            ));
        }
        Ok(order)
    }

    pub async fn all_orders(&self) -> Result<Vec<AdminOrder>, AppError> {
        self.orders.list_all().await
    }

    /// Admin transition. Strict adjacency is enforced: the target must be the
    /// single next forward step, or a cancellation of a non-terminal order.
    pub async fn update_status(&self, order_id: Uuid, status: &str) -> Result<Order, AppError> {
        let target = OrderStatus::parse(status).ok_or_else(|| {
            AppError::InvalidInput(
                "Invalid status. Must be one of: pending, confirmed, preparing, delivered, cancelled"
                    .into(),
            )
        })?;

        let order = self
            .orders
            .find(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

        if !order.status.can_transition_to(target) {
            return Err(AppError::InvalidState(format!(
                "Cannot move order from {} to {}",
                order.status.as_str(),
                target.as_str()
            )));
        }

        match self.orders.transition(order_id, order.status, target).await? {
            Some(order) => Ok(order),
            None => Err(AppError::InvalidState(
                "Order status changed concurrently".into(),
            )),
        }
    }

    /// Customer cancellation; only pending orders qualify.
    pub async fn cancel_order(&self, customer_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
        let order = self
            .orders
            .find(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

        if order.customer_id != customer_id {
            return Err(AppError::Forbidden(
                "Access denied. This is not your order.".into(),
            ));
        }
        if order.status != OrderStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Cannot cancel order with status: {}",
                order.status.as_str()
            )));
        }

        match self
            .orders
            .transition(order_id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await?
        {
            Some(order) => Ok(order),
            None => Err(AppError::InvalidState(
                "Order status changed concurrently".into(),
            )),
        }
    }
}
