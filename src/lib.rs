//! Client for a furniture ordering service.
//!
//! - [`selection`] aggregates catalog picks into a cart and builds order requests.
//! - [`filter`] decides which orders to show for a set of filter criteria.
//! - [`order_view`] runs the order view as a service task; talk to it through
//!   [`clients::OrderViewClient`].
//! - [`session`] resolves and persists the current user.
//! - [`api`] is the seam to the HTTP backend.

pub mod api;
pub mod app_system;
pub mod clients;
pub mod debounce;
pub mod domain;
pub mod error;
pub mod filter;
pub(crate) mod messages;
pub mod order_view;
pub mod selection;
pub mod session;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_api;
