use actix_web::{get, patch, web, HttpResponse};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::UpdateRestaurantRequest;
use crate::restaurant::RestaurantRepo;

#[get("/restaurant")]
pub async fn get_restaurant(repo: web::Data<RestaurantRepo>) -> Result<HttpResponse, AppError> {
    let restaurant = repo.get_or_seed().await?;
    Ok(HttpResponse::Ok().json(restaurant))
}

#[patch("/restaurant")]
pub async fn update_restaurant(
    repo: web::Data<RestaurantRepo>,
    auth: AuthUser,
    req: web::Json<UpdateRestaurantRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let restaurant = repo.update(&req).await?;
    Ok(HttpResponse::Ok().json(restaurant))
}
