use std::sync::Arc;

use uuid::Uuid;

use crate::cart_store::CartStore;
use crate::catalog::ProductCatalog;
use crate::error::AppError;
use crate::models::Cart;

/// Maintains the single active cart per customer. Line subtotals are
/// recomputed from the catalog's *current* price on every mutation, so stale
/// pricing self-corrects as the cart changes.
pub struct CartService {
    catalog: Arc<dyn ProductCatalog>,
    carts: Arc<dyn CartStore>,
}

impl CartService {
    pub fn new(catalog: Arc<dyn ProductCatalog>, carts: Arc<dyn CartStore>) -> Self {
        Self { catalog, carts }
    }

    pub async fn get_cart(&self, customer_id: Uuid) -> Result<Cart, AppError> {
        self.carts.get_or_create(customer_id).await
    }

    pub async fn add_item(
        &self,
        customer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, AppError> {
        if quantity <= 0 {
            return Err(AppError::InvalidInput(
                "Quantity must be a positive integer".into(),
            ));
        }

        let product = self
            .catalog
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
        if !product.is_available {
            return Err(AppError::Unavailable("Product is not available".into()));
        }

        let cart = self.carts.get_or_create(customer_id).await?;
        self.carts
            .merge_line(cart.id, product_id, quantity, product.price)
            .await?;

        self.carts.get_or_create(customer_id).await
    }

    /// A non-positive quantity deletes the line instead of erroring. This is
    /// deliberately asymmetric with `add_item`, which rejects non-positive
    /// quantities outright.
    pub async fn update_quantity(
        &self,
        customer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, AppError> {
        let cart = self.carts.get_or_create(customer_id).await?;

        if quantity <= 0 {
            self.carts.remove_line(cart.id, product_id).await?;
            return self.carts.get_or_create(customer_id).await;
        }

        let product = self
            .catalog
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

        let updated = self
            .carts
            .set_line(cart.id, product_id, quantity, product.price)
            .await?;
        if !updated {
            return Err(AppError::NotFound("Item not found in cart".into()));
        }

        self.carts.get_or_create(customer_id).await
    }

    /// Removing an absent line is idempotent success.
    pub async fn remove_item(&self, customer_id: Uuid, product_id: Uuid) -> Result<Cart, AppError> {
        let cart = self.carts.get_or_create(customer_id).await?;
        self.carts.remove_line(cart.id, product_id).await?;
        self.carts.get_or_create(customer_id).await
    }

    /// An already-empty cart clears fine; NotFound only when no cart record
    /// exists at all.
    pub async fn clear(&self, customer_id: Uuid) -> Result<Cart, AppError> {
        let existed = self.carts.clear(customer_id).await?;
        if !existed {
            return Err(AppError::NotFound("Cart not found".into()));
        }
        self.carts.get_or_create(customer_id).await
    }
}
