use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Cart, CartLine};

/// Persistence capability for carts. Each mutation must be atomic per cart
/// key; the Postgres implementation leans on single-statement upsert
/// arithmetic so concurrent mutations of the same cart cannot lose updates.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the customer's cart, persisting a new empty one on first call.
    async fn get_or_create(&self, customer_id: Uuid) -> Result<Cart, AppError>;

    async fn find(&self, customer_id: Uuid) -> Result<Option<Cart>, AppError>;

    /// Adds `quantity` to the line for `product_id`, creating it if absent.
    /// The line subtotal is recomputed as `catalog_price × merged quantity`,
    /// overwriting any stale value.
    async fn merge_line(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        catalog_price: f64,
    ) -> Result<(), AppError>;

    /// Sets the line quantity and recomputes the subtotal from
    /// `catalog_price`. Returns false if the line does not exist.
    async fn set_line(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        catalog_price: f64,
    ) -> Result<bool, AppError>;

    /// Removes the line if present; absence is not an error.
    async fn remove_line(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), AppError>;

    /// Empties all lines in place. Returns false if no cart record exists.
    async fn clear(&self, customer_id: Uuid) -> Result<bool, AppError>;
}

#[derive(FromRow)]
struct CartRow {
    id: Uuid,
    customer_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CartRepo {
    pool: PgPool,
}

impl CartRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, AppError> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT ci.product_id, p.name, p.price, p.image_url, p.is_available,
                   ci.quantity, ci.line_subtotal
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.added_at
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    async fn assemble(&self, row: CartRow) -> Result<Cart, AppError> {
        let items = self.load_lines(row.id).await?;
        Ok(Cart {
            id: row.id,
            customer_id: row.customer_id,
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn touch(&self, cart_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CartStore for CartRepo {
    async fn get_or_create(&self, customer_id: Uuid) -> Result<Cart, AppError> {
        // ON CONFLICT DO NOTHING keeps concurrent first accesses from racing
        // the unique customer_id constraint.
        sqlx::query("INSERT INTO carts (customer_id) VALUES ($1) ON CONFLICT (customer_id) DO NOTHING")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, customer_id, created_at, updated_at FROM carts WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        self.assemble(row).await
    }

    async fn find(&self, customer_id: Uuid) -> Result<Option<Cart>, AppError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, customer_id, created_at, updated_at FROM carts WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn merge_line(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        catalog_price: f64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity, line_subtotal)
            VALUES ($1, $2, $3, $4 * $3)
            ON CONFLICT (cart_id, product_id) DO UPDATE
            SET quantity = cart_items.quantity + EXCLUDED.quantity,
                line_subtotal = $4 * (cart_items.quantity + EXCLUDED.quantity)
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(catalog_price)
        .execute(&self.pool)
        .await?;

        self.touch(cart_id).await
    }

    async fn set_line(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        catalog_price: f64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE cart_items
            SET quantity = $3, line_subtotal = $4 * $3
            WHERE cart_id = $1 AND product_id = $2
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(catalog_price)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }
        self.touch(cart_id).await?;
        Ok(true)
    }

    async fn remove_line(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        self.touch(cart_id).await
    }

    async fn clear(&self, customer_id: Uuid) -> Result<bool, AppError> {
        let cart_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM carts WHERE customer_id = $1")
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(cart_id) = cart_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        self.touch(cart_id).await?;
        Ok(true)
    }
}
