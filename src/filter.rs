//! Order filtering.
//!
//! Criteria are not combined. [`FilterPlan::resolve`] walks a fixed priority
//! chain and the first criterion that applies decides the whole result:
//! selected user (admins only), then furniture style, then date range, then
//! nothing. User and style plans are answered by the backend; the date plan
//! runs over the orders already loaded.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::{Order, UserId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub selected_user_id: Option<UserId>,
    pub selected_furniture_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterPlan {
    ByUser(UserId),
    ByStyle(String),
    ByDate {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    All,
}

impl FilterPlan {
    pub fn resolve(criteria: &FilterCriteria, is_admin: bool) -> Self {
        if is_admin {
            if let Some(user_id) = criteria.selected_user_id {
                return FilterPlan::ByUser(user_id);
            }
        }

        if let Some(style) = criteria
            .selected_furniture_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return FilterPlan::ByStyle(style.to_string());
        }

        if criteria.start_date.is_some() || criteria.end_date.is_some() {
            return FilterPlan::ByDate {
                start: criteria.start_date,
                end: criteria.end_date,
            };
        }

        FilterPlan::All
    }
}

/// Last representable millisecond of `date`, so an end date covers the whole day.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN))
}

pub fn filter_by_date(
    orders: &[Order],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<Order> {
    let from = start.map(|d| d.and_time(NaiveTime::MIN));
    let until = end.map(end_of_day);

    orders
        .iter()
        .filter(|order| from.map_or(true, |from| order.date >= from))
        .filter(|order| until.map_or(true, |until| order.date <= until))
        .cloned()
        .collect()
}
