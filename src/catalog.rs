use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{CreateProductRequest, Product, UpdateProductRequest};

/// Read capability the cart service depends on. Kept as a trait so the
/// pricing logic can be exercised against an in-memory catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_by_id(&self, product_id: Uuid) -> Result<Option<Product>, AppError>;
}

#[derive(Clone)]
pub struct ProductRepo {
    pool: PgPool,
}

impl ProductRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_available(&self) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, category, price, image_url, is_available, created_at, updated_at
            FROM products
            WHERE is_available = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get(&self, product_id: Uuid) -> Result<Product, AppError> {
        self.find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))
    }

    pub async fn create(&self, req: &CreateProductRequest) -> Result<Product, AppError> {
        if req.name.trim().is_empty() || req.category.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Name, price, and category are required".into(),
            ));
        }
        if req.price < 0.0 {
            return Err(AppError::InvalidInput("Price must not be negative".into()));
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, category, price, image_url, is_available)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, category, price, image_url, is_available, created_at, updated_at
            "#,
        )
        .bind(&req.name)
        .bind(req.description.as_ref())
        .bind(&req.category)
        .bind(req.price)
        .bind(req.image_url.as_ref())
        .bind(req.is_available.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn update(
        &self,
        product_id: Uuid,
        req: &UpdateProductRequest,
    ) -> Result<Product, AppError> {
        if let Some(price) = req.price {
            if price < 0.0 {
                return Err(AppError::InvalidInput("Price must not be negative".into()));
            }
        }

        let result = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET
              name = COALESCE($1, name),
              description = COALESCE($2, description),
              category = COALESCE($3, category),
              price = COALESCE($4, price),
              image_url = COALESCE($5, image_url),
              is_available = COALESCE($6, is_available),
              updated_at = NOW()
            WHERE id = $7
            RETURNING id, name, description, category, price, image_url, is_available, created_at, updated_at
            "#,
        )
        .bind(req.name.as_ref())
        .bind(req.description.as_ref())
        .bind(req.category.as_ref())
        .bind(req.price)
        .bind(req.image_url.as_ref())
        .bind(req.is_available)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        result.ok_or_else(|| AppError::NotFound("Product not found".into()))
    }

    pub async fn delete(&self, product_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product not found".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for ProductRepo {
    async fn find_by_id(&self, product_id: Uuid) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, category, price, image_url, is_available, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
