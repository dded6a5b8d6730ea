use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{Restaurant, UpdateRestaurantRequest};

/// Singleton restaurant record: created with defaults on first read, patched
/// in place by admins.
#[derive(Clone)]
pub struct RestaurantRepo {
    pool: PgPool,
}

impl RestaurantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find(&self) -> Result<Option<Restaurant>, AppError> {
        let row = sqlx::query_as::<_, Restaurant>(
            r#"
            SELECT id, name, description, address, phone, opening_hours, created_at, updated_at
            FROM restaurant_info
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_or_seed(&self) -> Result<Restaurant, AppError> {
        if let Some(restaurant) = self.find().await? {
            return Ok(restaurant);
        }

        let restaurant = sqlx::query_as::<_, Restaurant>(
            r#"
            INSERT INTO restaurant_info (name, description, address, phone, opening_hours)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, address, phone, opening_hours, created_at, updated_at
            "#,
        )
        .bind("Our Restaurant")
        .bind("Welcome to our restaurant! We serve delicious food.")
        .bind("123 Main Street, City, Country")
        .bind("+1234567890")
        .bind("Mon-Sun: 9:00 AM - 10:00 PM")
        .fetch_one(&self.pool)
        .await?;

        Ok(restaurant)
    }

    pub async fn update(&self, req: &UpdateRestaurantRequest) -> Result<Restaurant, AppError> {
        let current = self.get_or_seed().await?;

        let restaurant = sqlx::query_as::<_, Restaurant>(
            r#"
            UPDATE restaurant_info
            SET
              name = COALESCE($1, name),
              description = COALESCE($2, description),
              address = COALESCE($3, address),
              phone = COALESCE($4, phone),
              opening_hours = COALESCE($5, opening_hours),
              updated_at = NOW()
            WHERE id = $6
            RETURNING id, name, description, address, phone, opening_hours, created_at, updated_at
            "#,
        )
        .bind(req.name.as_ref())
        .bind(req.description.as_ref())
        .bind(req.address.as_ref())
        .bind(req.phone.as_ref())
        .bind(req.opening_hours.as_ref())
        .bind(current.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(restaurant)
    }
}
