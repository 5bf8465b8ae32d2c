//! Cart aggregation.
//!
//! A [`Selection`] maps a furniture option's composite key to the option and how
//! many units of it are in the cart. All functions here are pure: they take the
//! current selection by reference and hand back a new one.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Utc};
use tracing::debug;

use crate::domain::{FurnitureOption, OrderCreate, OrderLineItem, User};

/// A cart entry. `quantity` is always at least 1 while the entry exists.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedItem {
    pub option: FurnitureOption,
    pub quantity: u32,
}

pub type Selection = BTreeMap<String, SelectedItem>;

/// Adds one unit of `item`, creating the entry on first selection.
pub fn toggle_selection(current: &Selection, item: &FurnitureOption) -> Selection {
    let mut next = current.clone();
    next.entry(item.key())
        .and_modify(|entry| entry.quantity = entry.quantity.saturating_add(1))
        .or_insert_with(|| SelectedItem {
            option: item.clone(),
            quantity: 1,
        });
    next
}

/// Adjusts the quantity of `key` by `delta`, dropping the entry once it reaches zero.
///
/// An unknown key leaves the selection as it was.
pub fn change_quantity(current: &Selection, key: &str, delta: i64) -> Selection {
    let mut next = current.clone();
    let Some(entry) = next.get_mut(key) else {
        debug!(key, delta, "Quantity change for item not in cart ignored");
        return next;
    };

    let quantity = i64::from(entry.quantity).saturating_add(delta);
    if quantity <= 0 {
        next.remove(key);
    } else {
        entry.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
    }
    next
}

pub fn compute_total(selection: &Selection) -> f64 {
    selection
        .values()
        .map(|entry| entry.option.price * f64::from(entry.quantity))
        .sum()
}

pub fn item_count(selection: &Selection) -> u32 {
    selection
        .values()
        .fold(0u32, |count, entry| count.saturating_add(entry.quantity))
}

/// Flattens the cart into an order request stamped with the current time.
pub fn build_order_payload(selection: &Selection, user: &User) -> OrderCreate {
    build_order_payload_at(selection, user, Utc::now().naive_utc())
}

/// Flattens the cart into an order request: one line item per unit, with the
/// copies of each entry kept together.
pub fn build_order_payload_at(
    selection: &Selection,
    user: &User,
    submitted_at: NaiveDateTime,
) -> OrderCreate {
    let furnitures: Vec<OrderLineItem> = selection
        .values()
        .flat_map(|entry| {
            std::iter::repeat_with(move || entry.option.to_line_item()).take(entry.quantity as usize)
        })
        .collect();

    OrderCreate {
        user_id: user.id,
        user: user.clone(),
        date: submitted_at,
        furnitures,
    }
}
