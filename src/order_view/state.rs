use crate::domain::{FurnitureOption, Order, OrderId};
use crate::filter::FilterCriteria;
use crate::selection::{item_count, Selection};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    LoadError,
}

/// Everything a presentation layer needs to render the order view.
///
/// Published whole after every change; subscribers never observe a
/// half-applied update.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub status: ViewStatus,
    /// Unfiltered orders: all of them for an admin, the user's own otherwise.
    pub orders: Vec<Order>,
    /// Orders left after applying the winning filter.
    pub visible: Vec<Order>,
    pub criteria: FilterCriteria,
    /// Set while a criteria change has not been reflected in `visible` yet.
    pub filters_pending: bool,
    pub error: Option<String>,
    pub catalog: Vec<FurnitureOption>,
    pub selection: Selection,
    pub total: f64,
}

impl ViewState {
    pub fn visible_ids(&self) -> Vec<OrderId> {
        self.visible.iter().map(|o| o.id).collect()
    }

    pub fn order_ids(&self) -> Vec<OrderId> {
        self.orders.iter().map(|o| o.id).collect()
    }

    pub fn cart_items(&self) -> u32 {
        item_count(&self.selection)
    }

    pub fn is_settled(&self) -> bool {
        !self.filters_pending && self.status != ViewStatus::Loading
    }
}
