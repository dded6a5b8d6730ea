//! In-memory doubles for the storage and catalog capabilities, used by the
//! service unit tests. All state sits behind one mutex so cross-store
//! operations (checkout's insert-and-clear) are atomic, matching the
//! transactional guarantee of the Postgres implementations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::cart_store::CartStore;
use crate::catalog::ProductCatalog;
use crate::error::AppError;
use crate::models::{AdminOrder, Cart, CartLine, Order, OrderLine, OrderStatus, OwnerSummary, Product};
use crate::order_store::{NewOrderItem, OrderStore};

#[derive(Clone)]
struct MemLine {
    product_id: Uuid,
    quantity: i32,
    line_subtotal: f64,
}

struct MemCart {
    id: Uuid,
    customer_id: Uuid,
    lines: Vec<MemLine>,
}

#[derive(Default)]
struct State {
    products: HashMap<Uuid, Product>,
    carts: Vec<MemCart>,
    orders: Vec<Order>,
    owners: HashMap<Uuid, OwnerSummary>,
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&self, price: f64, available: bool) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.state.lock().unwrap().products.insert(
            id,
            Product {
                id,
                name: format!("product-{id}"),
                description: None,
                category: "mains".into(),
                price,
                image_url: None,
                is_available: available,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn set_price(&self, product_id: Uuid, price: f64) {
        let mut state = self.state.lock().unwrap();
        state.products.get_mut(&product_id).unwrap().price = price;
    }

    pub fn insert_owner(&self, customer_id: Uuid, name: &str, email: &str) {
        self.state.lock().unwrap().owners.insert(
            customer_id,
            OwnerSummary {
                name: name.into(),
                email: email.into(),
                phone: None,
            },
        );
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    pub fn cart_line_count(&self, customer_id: Uuid) -> usize {
        let state = self.state.lock().unwrap();
        state
            .carts
            .iter()
            .find(|c| c.customer_id == customer_id)
            .map(|c| c.lines.len())
            .unwrap_or(0)
    }
}

fn view(state: &State, cart: &MemCart) -> Cart {
    let now = Utc::now();
    let items = cart
        .lines
        .iter()
        .map(|line| {
            let product = state.products.get(&line.product_id).unwrap();
            CartLine {
                product_id: line.product_id,
                name: product.name.clone(),
                price: product.price,
                image_url: product.image_url.clone(),
                is_available: product.is_available,
                quantity: line.quantity,
                line_subtotal: line.line_subtotal,
            }
        })
        .collect();
    Cart {
        id: cart.id,
        customer_id: cart.customer_id,
        items,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl ProductCatalog for MemoryBackend {
    async fn find_by_id(&self, product_id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.state.lock().unwrap().products.get(&product_id).cloned())
    }
}

#[async_trait]
impl CartStore for MemoryBackend {
    async fn get_or_create(&self, customer_id: Uuid) -> Result<Cart, AppError> {
        let mut state = self.state.lock().unwrap();
        if !state.carts.iter().any(|c| c.customer_id == customer_id) {
            state.carts.push(MemCart {
                id: Uuid::new_v4(),
                customer_id,
                lines: Vec::new(),
            });
        }
        let cart = state
            .carts
            .iter()
            .find(|c| c.customer_id == customer_id)
            .unwrap();
        Ok(view(&state, cart))
    }

    async fn find(&self, customer_id: Uuid) -> Result<Option<Cart>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .carts
            .iter()
            .find(|c| c.customer_id == customer_id)
            .map(|cart| view(&state, cart)))
    }

    async fn merge_line(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        catalog_price: f64,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let cart = state.carts.iter_mut().find(|c| c.id == cart_id).unwrap();
        match cart.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity += quantity;
                line.line_subtotal = catalog_price * f64::from(line.quantity);
            }
            None => cart.lines.push(MemLine {
                product_id,
                quantity,
                line_subtotal: catalog_price * f64::from(quantity),
            }),
        }
        Ok(())
    }

    async fn set_line(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        catalog_price: f64,
    ) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let cart = state.carts.iter_mut().find(|c| c.id == cart_id).unwrap();
        match cart.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                line.line_subtotal = catalog_price * f64::from(quantity);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_line(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let cart = state.carts.iter_mut().find(|c| c.id == cart_id).unwrap();
        cart.lines.retain(|l| l.product_id != product_id);
        Ok(())
    }

    async fn clear(&self, customer_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        match state.carts.iter_mut().find(|c| c.customer_id == customer_id) {
            Some(cart) => {
                cart.lines.clear();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl OrderStore for MemoryBackend {
    async fn create(
        &self,
        customer_id: Uuid,
        items: Vec<NewOrderItem>,
        total_price: f64,
        notes: Option<String>,
    ) -> Result<Order, AppError> {
        // One lock for insert + cart clear, mirroring the SQL transaction.
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            customer_id,
            status: OrderStatus::Pending,
            items: items
                .into_iter()
                .map(|item| OrderLine {
                    product_id: item.product_id,
                    name: state.products.get(&item.product_id).map(|p| p.name.clone()),
                    image_url: None,
                    quantity: item.quantity,
                    line_subtotal: item.line_subtotal,
                })
                .collect(),
            total_price,
            notes,
            created_at: now,
            updated_at: now,
        };
        state.orders.push(order.clone());
        if let Some(cart) = state.carts.iter_mut().find(|c| c.customer_id == customer_id) {
            cart.lines.clear();
        }
        Ok(order)
    }

    async fn find(&self, order_id: Uuid) -> Result<Option<Order>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<AdminOrder>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .rev()
            .map(|order| AdminOrder {
                order: order.clone(),
                customer: state.owners.get(&order.customer_id).cloned(),
            })
            .collect())
    }

    async fn transition(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let mut state = self.state.lock().unwrap();
        match state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && o.status == from)
        {
            Some(order) => {
                order.status = to;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            None => Ok(None),
        }
    }
}
