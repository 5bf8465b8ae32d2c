//! Access to the orders backend.
//!
//! [`OrderApi`] is the seam between the view logic and the network. The
//! production implementation is [`HttpOrderApi`]; tests substitute an
//! in-memory one.

mod http;

pub use http::*;

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use crate::domain::{FurnitureOption, Order, OrderCreate, OrderId, User, UserId};
use crate::error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

pub trait OrderApi: Send + Sync + 'static {
    fn list_users(&self) -> impl Future<Output = ApiResult<Vec<User>>> + Send;

    fn create_user(&self, name: &str) -> impl Future<Output = ApiResult<User>> + Send;

    fn list_orders(&self) -> impl Future<Output = ApiResult<Vec<Order>>> + Send;

    fn orders_by_user(&self, user_id: UserId) -> impl Future<Output = ApiResult<Vec<Order>>> + Send;

    fn orders_by_style(&self, style: &str) -> impl Future<Output = ApiResult<Vec<Order>>> + Send;

    fn create_order(&self, order: &OrderCreate) -> impl Future<Output = ApiResult<Order>> + Send;

    fn delete_order(&self, id: OrderId) -> impl Future<Output = ApiResult<()>> + Send;

    /// Catalog entry for one (style, type) combination.
    fn furniture(
        &self,
        style: &str,
        kind: &str,
    ) -> impl Future<Output = ApiResult<FurnitureOption>> + Send;
}

/// Loads the catalog as the cross product of `styles` and `kinds`.
///
/// Combinations that fail are logged and left out; the rest keep the order
/// of the cross product.
#[instrument(skip(api))]
pub async fn fetch_catalog<A: OrderApi>(
    api: Arc<A>,
    styles: &[String],
    kinds: &[String],
) -> Vec<FurnitureOption> {
    let mut tasks = JoinSet::new();
    let combinations = styles
        .iter()
        .flat_map(|style| kinds.iter().map(move |kind| (style.clone(), kind.clone())));

    for (index, (style, kind)) in combinations.enumerate() {
        let api = Arc::clone(&api);
        tasks.spawn(async move {
            let result = api.furniture(&style, &kind).await;
            (index, style, kind, result)
        });
    }

    let mut found = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, _, Ok(option))) => found.push((index, option)),
            Ok((_, style, kind, Err(e))) => {
                warn!(%style, %kind, error = %e, "Catalog entry unavailable, skipping");
            }
            Err(e) => warn!(error = %e, "Catalog fetch task failed"),
        }
    }

    found.sort_by_key(|(index, _)| *index);
    info!(entries = found.len(), "Catalog loaded");
    found.into_iter().map(|(_, option)| option).collect()
}
