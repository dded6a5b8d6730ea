use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::cart_service::CartService;
use crate::error::AppError;
use crate::models::{AddItemRequest, UpdateQuantityRequest};

#[get("/cart")]
pub async fn get_cart(
    service: web::Data<CartService>,
    auth: AuthUser,
) -> Result<HttpResponse, AppError> {
    auth.require_customer()?;
    let cart = service.get_cart(auth.id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

#[post("/cart/items")]
pub async fn add_item(
    service: web::Data<CartService>,
    auth: AuthUser,
    req: web::Json<AddItemRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require_customer()?;
    let cart = service
        .add_item(auth.id, req.product_id, req.quantity)
        .await?;
    Ok(HttpResponse::Ok().json(cart))
}

#[patch("/cart/items/{product_id}")]
pub async fn update_quantity(
    service: web::Data<CartService>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateQuantityRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require_customer()?;
    let cart = service
        .update_quantity(auth.id, path.into_inner(), req.quantity)
        .await?;
    Ok(HttpResponse::Ok().json(cart))
}

#[delete("/cart/items/{product_id}")]
pub async fn remove_item(
    service: web::Data<CartService>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    auth.require_customer()?;
    let cart = service.remove_item(auth.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(cart))
}

#[delete("/cart")]
pub async fn clear_cart(
    service: web::Data<CartService>,
    auth: AuthUser,
) -> Result<HttpResponse, AppError> {
    auth.require_customer()?;
    let cart = service.clear(auth.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Cart cleared", "cart": cart })))
}
