use chrono::NaiveDate;
use tokio::sync::oneshot;

use crate::api::ApiResult;
use crate::domain::{FurnitureOption, Order, OrderId, UserId};
use crate::error::ViewError;

pub type ViewResponse<T> = oneshot::Sender<Result<T, ViewError>>;

/// Requests understood by the order view service. Each caller-facing variant
/// carries a oneshot channel for the reply.
#[derive(Debug)]
pub(crate) enum ViewRequest {
    Reload {
        respond_to: ViewResponse<()>,
    },
    SetUserFilter {
        user_id: Option<UserId>,
        respond_to: ViewResponse<()>,
    },
    SetStyleFilter {
        style: Option<String>,
        respond_to: ViewResponse<()>,
    },
    SetDateRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        respond_to: ViewResponse<()>,
    },
    ClearFilters {
        respond_to: ViewResponse<()>,
    },
    DeleteOrder {
        id: OrderId,
        respond_to: ViewResponse<()>,
    },
    LoadCatalog {
        respond_to: ViewResponse<usize>,
    },
    ToggleItem {
        option: FurnitureOption,
        respond_to: ViewResponse<()>,
    },
    ChangeQuantity {
        key: String,
        delta: i64,
        respond_to: ViewResponse<()>,
    },
    SubmitOrder {
        respond_to: ViewResponse<Order>,
    },
    Shutdown,
    Completed(Completion),
}

/// Results posted back to the service by the tasks it spawned.
#[derive(Debug)]
pub(crate) enum Completion {
    FiltersDue {
        generation: u64,
    },
    BaselineLoaded {
        token: u64,
        result: ApiResult<Vec<Order>>,
        respond_to: Option<ViewResponse<()>>,
    },
    VisibleLoaded {
        token: u64,
        result: ApiResult<Vec<Order>>,
    },
    OrderDeleted {
        id: OrderId,
        result: ApiResult<()>,
        respond_to: ViewResponse<()>,
    },
    OrderCreated {
        result: ApiResult<Order>,
        respond_to: ViewResponse<Order>,
    },
    CatalogLoaded {
        catalog: Vec<FurnitureOption>,
        respond_to: ViewResponse<usize>,
    },
}
