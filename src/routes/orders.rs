use actix_web::{delete, get, patch, post, web, HttpResponse};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{CreateOrderRequest, UpdateOrderStatusRequest};
use crate::order_service::OrderService;

#[post("/orders")]
pub async fn create_order(
    service: web::Data<OrderService>,
    auth: AuthUser,
    req: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require_customer()?;
    let order = service
        .create_order(auth.id, req.into_inner().notes)
        .await?;
    Ok(HttpResponse::Created().json(order))
}

#[get("/orders")]
pub async fn my_orders(
    service: web::Data<OrderService>,
    auth: AuthUser,
) -> Result<HttpResponse, AppError> {
    auth.require_customer()?;
    let orders = service.my_orders(auth.id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

// Registered before `/orders/{id}` so "admin" never parses as an order id.
#[get("/orders/admin/all")]
pub async fn all_orders(
    service: web::Data<OrderService>,
    auth: AuthUser,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let orders = service.all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

#[get("/orders/{id}")]
pub async fn order_by_id(
    service: web::Data<OrderService>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    auth.require_customer()?;
    let order = service.order_by_id(auth.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

#[patch("/orders/{id}/status")]
pub async fn update_status(
    service: web::Data<OrderService>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let order = service
        .update_status(path.into_inner(), &req.status)
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

#[delete("/orders/{id}")]
pub async fn cancel_order(
    service: web::Data<OrderService>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    auth.require_customer()?;
    let order = service.cancel_order(auth.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}
