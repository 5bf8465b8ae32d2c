use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{OrderLineItem, User, UserId};

pub type OrderId = i64;

/// A placed order, as returned by the orders endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub user: User,
    #[serde(with = "super::timestamp")]
    pub date: NaiveDateTime,
    #[serde(default)]
    pub furnitures: Vec<OrderLineItem>,
    #[serde(default)]
    pub price: f64,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub user_id: UserId,
    pub user: User,
    #[serde(with = "super::timestamp")]
    pub date: NaiveDateTime,
    pub furnitures: Vec<OrderLineItem>,
}

impl Order {
    pub fn contains_style(&self, style: &str) -> bool {
        self.furnitures.iter().any(|item| item.has_style(style))
    }
}
