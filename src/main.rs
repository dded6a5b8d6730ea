use std::env;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenvy::dotenv;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use restaurant_api::auth::JwtConfig;
use restaurant_api::cart_service::CartService;
use restaurant_api::cart_store::CartRepo;
use restaurant_api::catalog::ProductRepo;
use restaurant_api::db;
use restaurant_api::order_service::OrderService;
use restaurant_api::order_store::OrderRepo;
use restaurant_api::restaurant::RestaurantRepo;
use restaurant_api::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,restaurant_api=debug")),
        )
        .init();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let addr = format!("{}:{}", host, port);

    let pool = db::get_db_pool(&database_url)
        .await
        .expect("Failed to connect to Postgres");

    let product_repo = ProductRepo::new(pool.clone());
    let cart_repo = CartRepo::new(pool.clone());
    let order_repo = OrderRepo::new(pool.clone());
    let restaurant_repo = RestaurantRepo::new(pool);

    let cart_service = web::Data::new(CartService::new(
        Arc::new(product_repo.clone()),
        Arc::new(cart_repo.clone()),
    ));
    let order_service = web::Data::new(OrderService::new(
        Arc::new(cart_repo),
        Arc::new(order_repo),
    ));
    let product_repo = web::Data::new(product_repo);
    let restaurant_repo = web::Data::new(restaurant_repo);
    let jwt = web::Data::new(JwtConfig { secret: jwt_secret });

    tracing::info!("Restaurant API running at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(cart_service.clone())
            .app_data(order_service.clone())
            .app_data(product_repo.clone())
            .app_data(restaurant_repo.clone())
            .app_data(jwt.clone())
            .service(routes::cart::get_cart)
            .service(routes::cart::add_item)
            .service(routes::cart::update_quantity)
            .service(routes::cart::remove_item)
            .service(routes::cart::clear_cart)
            .service(routes::orders::create_order)
            .service(routes::orders::my_orders)
            .service(routes::orders::all_orders)
            .service(routes::orders::order_by_id)
            .service(routes::orders::update_status)
            .service(routes::orders::cancel_order)
            .service(routes::products::list_products)
            .service(routes::products::get_product)
            .service(routes::products::create_product)
            .service(routes::products::update_product)
            .service(routes::products::delete_product)
            .service(routes::restaurant::get_restaurant)
            .service(routes::restaurant::update_restaurant)
    })
    .bind(addr)?
    .run()
    .await
}
