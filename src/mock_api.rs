//! # Mock API
//!
//! An in-memory [`OrderApi`] for exercising the view service and session logic
//! without a backend.
//!
//! Every call is appended to a log so tests can assert which endpoints were hit
//! and in what order. Individual calls can be scripted to fail or to take a
//! while (with tokio's paused clock this is deterministic).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::api::{ApiResult, OrderApi};
use crate::domain::{FurnitureOption, Order, OrderCreate, OrderId, User, UserId};
use crate::error::ApiError;

#[derive(Default)]
struct MockState {
    users: Vec<User>,
    orders: Vec<Order>,
    catalog: Vec<FurnitureOption>,
    calls: Vec<String>,
    failures: HashMap<String, ApiError>,
    delays: HashMap<String, Duration>,
    next_id: i64,
}

#[derive(Default)]
pub struct MockOrderApi {
    state: Mutex<MockState>,
}

impl MockOrderApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.state.lock().unwrap().next_id = 1000;
        api
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        let api = Self::new();
        {
            let mut state = api.state.lock().unwrap();
            for order in &orders {
                if !state.users.iter().any(|u| u.id == order.user.id) {
                    state.users.push(order.user.clone());
                }
            }
            state.orders = orders;
        }
        api
    }

    pub fn add_user(&self, user: User) {
        self.state.lock().unwrap().users.push(user);
    }

    pub fn add_furniture(&self, option: FurnitureOption) {
        self.state.lock().unwrap().catalog.push(option);
    }

    /// Every call whose log entry equals `call` fails with `error` until cleared.
    pub fn fail(&self, call: &str, error: ApiError) {
        self.state.lock().unwrap().failures.insert(call.to_string(), error);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    pub fn delay(&self, call: &str, by: Duration) {
        self.state.lock().unwrap().delays.insert(call.to_string(), by);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }

    pub fn stored_orders(&self) -> Vec<Order> {
        self.state.lock().unwrap().orders.clone()
    }

    async fn record(&self, call: String) -> ApiResult<()> {
        let (delay, failure) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call.clone());
            (state.delays.get(&call).copied(), state.failures.get(&call).cloned())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl OrderApi for MockOrderApi {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.record("GET /users".to_string()).await?;
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn create_user(&self, name: &str) -> ApiResult<User> {
        self.record(format!("POST /users {name}")).await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let user = User::new(state.next_id, name);
        state.users.push(user.clone());
        Ok(user)
    }

    async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        self.record("GET /orders".to_string()).await?;
        Ok(self.state.lock().unwrap().orders.clone())
    }

    async fn orders_by_user(&self, user_id: UserId) -> ApiResult<Vec<Order>> {
        self.record(format!("GET /orders/by-user/{user_id}")).await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn orders_by_style(&self, style: &str) -> ApiResult<Vec<Order>> {
        self.record(format!("GET /orders/by-furniture-type?type={style}")).await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .filter(|o| o.contains_style(style))
            .cloned()
            .collect())
    }

    async fn create_order(&self, order: &OrderCreate) -> ApiResult<Order> {
        self.record("POST /orders".to_string()).await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = Order {
            id: state.next_id,
            user_id: order.user_id,
            user: order.user.clone(),
            date: order.date,
            furnitures: order.furnitures.clone(),
            price: order.furnitures.iter().map(|item| item.price).sum(),
        };
        state.orders.push(created.clone());
        Ok(created)
    }

    async fn delete_order(&self, id: OrderId) -> ApiResult<()> {
        self.record(format!("DELETE /orders/{id}")).await?;
        let mut state = self.state.lock().unwrap();
        let before = state.orders.len();
        state.orders.retain(|o| o.id != id);
        if state.orders.len() == before {
            return Err(ApiError::NotFound(format!("/orders/{id}")));
        }
        Ok(())
    }

    async fn furniture(&self, style: &str, kind: &str) -> ApiResult<FurnitureOption> {
        self.record(format!("GET /{style}/{kind}")).await?;
        let state = self.state.lock().unwrap();
        state
            .catalog
            .iter()
            .find(|o| o.style == style && o.kind == kind)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/{style}/{kind}")))
    }
}
