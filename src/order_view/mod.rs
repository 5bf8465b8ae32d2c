//! The order view: orders, filters and cart owned by one service task.

mod service;
mod state;

pub use service::*;
pub use state::*;

use std::fmt;
use std::time::Duration;

use crate::domain::OrderId;

/// Tunables for [`OrderViewService`].
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub buffer_size: usize,
    pub filter_debounce: Duration,
    pub catalog_styles: Vec<String>,
    pub catalog_kinds: Vec<String>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            filter_debounce: Duration::from_millis(300),
            catalog_styles: Vec::new(),
            catalog_kinds: Vec::new(),
        }
    }
}

/// Network actions that must not be triggered again while outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingAction {
    Reload,
    Delete(OrderId),
    Submit,
    Catalog,
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingAction::Reload => write!(f, "Reloading orders"),
            PendingAction::Delete(id) => write!(f, "Deleting order {id}"),
            PendingAction::Submit => write!(f, "Submitting the order"),
            PendingAction::Catalog => write!(f, "Loading the catalog"),
        }
    }
}
