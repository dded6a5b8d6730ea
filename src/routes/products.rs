use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::catalog::ProductRepo;
use crate::error::AppError;
use crate::models::{CreateProductRequest, UpdateProductRequest};

#[get("/products")]
pub async fn list_products(repo: web::Data<ProductRepo>) -> Result<HttpResponse, AppError> {
    let products = repo.list_available().await?;
    Ok(HttpResponse::Ok().json(products))
}

#[get("/products/{id}")]
pub async fn get_product(
    repo: web::Data<ProductRepo>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product = repo.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

#[post("/products")]
pub async fn create_product(
    repo: web::Data<ProductRepo>,
    auth: AuthUser,
    req: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let product = repo.create(&req).await?;
    Ok(HttpResponse::Created().json(product))
}

#[patch("/products/{id}")]
pub async fn update_product(
    repo: web::Data<ProductRepo>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let product = repo.update(path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(product))
}

#[delete("/products/{id}")]
pub async fn delete_product(
    repo: web::Data<ProductRepo>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    repo.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}
