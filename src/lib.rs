pub mod auth;
pub mod cart_service;
pub mod cart_store;
pub mod catalog;
pub mod db;
pub mod error;
pub mod models;
pub mod order_service;
pub mod order_store;
pub mod restaurant;
pub mod routes;

#[cfg(test)]
pub(crate) mod testutil;
