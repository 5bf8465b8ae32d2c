use chrono::NaiveDate;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::domain::{FurnitureOption, Order, OrderId, UserId};
use crate::error::ViewError;
use crate::messages::ViewRequest;
use crate::order_view::ViewState;

/// Cloneable handle to a running [`OrderViewService`](crate::order_view::OrderViewService).
///
/// Commands go through the request channel; state comes back through a watch
/// channel, so any number of observers can follow the view.
#[derive(Clone)]
pub struct OrderViewClient {
    sender: mpsc::Sender<ViewRequest>,
    state: watch::Receiver<ViewState>,
}

impl OrderViewClient {
    pub(crate) fn new(sender: mpsc::Sender<ViewRequest>, state: watch::Receiver<ViewState>) -> Self {
        Self { sender, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Waits until no filter change or network action is outstanding.
    pub async fn settled(&self) -> Result<ViewState, ViewError> {
        let mut state = self.subscribe();
        let settled = state
            .wait_for(ViewState::is_settled)
            .await
            .map_err(|_| ViewError::ServiceClosed("Service stopped".to_string()))?;
        Ok(settled.clone())
    }

    pub async fn shutdown(&self) -> Result<(), ViewError> {
        debug!("Requesting shutdown");
        self.sender
            .send(ViewRequest::Shutdown)
            .await
            .map_err(|_| ViewError::ServiceClosed("Service closed".to_string()))
    }
}

client_method!(OrderViewClient => fn reload() -> () as ViewRequest::Reload);
client_method!(OrderViewClient => fn set_user_filter(user_id: Option<UserId>) -> () as ViewRequest::SetUserFilter);
client_method!(OrderViewClient => fn set_style_filter(style: Option<String>) -> () as ViewRequest::SetStyleFilter);
client_method!(OrderViewClient => fn set_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> () as ViewRequest::SetDateRange);
client_method!(OrderViewClient => fn clear_filters() -> () as ViewRequest::ClearFilters);
client_method!(OrderViewClient => fn delete_order(id: OrderId) -> () as ViewRequest::DeleteOrder);
client_method!(OrderViewClient => fn load_catalog() -> usize as ViewRequest::LoadCatalog);
client_method!(OrderViewClient => fn toggle_item(option: FurnitureOption) -> () as ViewRequest::ToggleItem);
client_method!(OrderViewClient => fn change_quantity(key: String, delta: i64) -> () as ViewRequest::ChangeQuantity);
client_method!(OrderViewClient => fn submit_order() -> Order as ViewRequest::SubmitOrder);
