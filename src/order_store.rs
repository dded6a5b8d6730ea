use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{AdminOrder, Order, OrderLine, OrderStatus, OwnerSummary};

/// Item snapshot handed to the store at checkout, copied verbatim from the
/// cart line (no price recomputation at this stage).
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub line_subtotal: f64,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order in `pending` status and empties the customer's cart
    /// in the same transaction. The cart must never be cleared unless the
    /// insert succeeded.
    async fn create(
        &self,
        customer_id: Uuid,
        items: Vec<NewOrderItem>,
        total_price: f64,
        notes: Option<String>,
    ) -> Result<Order, AppError>;

    async fn find(&self, order_id: Uuid) -> Result<Option<Order>, AppError>;

    /// Orders owned by the customer, newest first.
    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, AppError>;

    /// All orders, newest first, annotated with owner identity.
    async fn list_all(&self) -> Result<Vec<AdminOrder>, AppError>;

    /// Compare-and-set transition; returns the updated order, or None if the
    /// order's status was no longer `from` (lost race or stale read).
    async fn transition(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, AppError>;
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    status: OrderStatus,
    total_price: f64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct AdminOrderRow {
    id: Uuid,
    customer_id: Uuid,
    status: OrderStatus,
    total_price: f64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Clone)]
pub struct OrderRepo {
    pool: PgPool,
}

impl OrderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, order_id: Uuid) -> Result<Vec<OrderLine>, AppError> {
        // LEFT JOIN: the snapshot outlives the catalog entry.
        let items = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT oi.product_id, p.name, p.image_url, oi.quantity, oi.line_subtotal
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn assemble(&self, row: OrderRow) -> Result<Order, AppError> {
        let items = self.load_items(row.id).await?;
        Ok(Order {
            id: row.id,
            customer_id: row.customer_id,
            status: row.status,
            items,
            total_price: row.total_price,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl OrderStore for OrderRepo {
    async fn create(
        &self,
        customer_id: Uuid,
        items: Vec<NewOrderItem>,
        total_price: f64,
        notes: Option<String>,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (customer_id, status, total_price, notes)
            VALUES ($1, 'pending', $2, $3)
            RETURNING id, customer_id, status, total_price, notes, created_at, updated_at
            "#,
        )
        .bind(customer_id)
        .bind(total_price)
        .bind(notes.as_ref())
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, quantity, line_subtotal)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(row.id)
            .bind(position as i32)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.line_subtotal)
            .execute(&mut *tx)
            .await?;
        }

        // Same transaction: a successful order always leaves an empty cart.
        sqlx::query(
            "DELETE FROM cart_items WHERE cart_id = (SELECT id FROM carts WHERE customer_id = $1)",
        )
        .bind(customer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.assemble(row).await
    }

    async fn find(&self, order_id: Uuid) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, status, total_price, notes, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, status, total_price, notes, created_at, updated_at
            FROM orders
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.assemble(row).await?);
        }
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<AdminOrder>, AppError> {
        let rows = sqlx::query_as::<_, AdminOrderRow>(
            r#"
            SELECT o.id, o.customer_id, o.status, o.total_price, o.notes,
                   o.created_at, o.updated_at,
                   u.full_name, u.email, u.phone
            FROM orders o
            LEFT JOIN users u ON u.id = o.customer_id
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let customer = match (row.full_name, row.email) {
                (Some(name), Some(email)) => Some(OwnerSummary {
                    name,
                    email,
                    phone: row.phone,
                }),
                _ => None,
            };
            let items = self.load_items(row.id).await?;
            orders.push(AdminOrder {
                order: Order {
                    id: row.id,
                    customer_id: row.customer_id,
                    status: row.status,
                    items,
                    total_price: row.total_price,
                    notes: row.notes,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                },
                customer,
            });
        }
        Ok(orders)
    }

    async fn transition(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            UPDATE orders
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, customer_id, status, total_price, notes, created_at, updated_at
            "#,
        )
        .bind(order_id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }
}
