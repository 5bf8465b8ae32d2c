//! Configuration, startup, and shutdown.

pub mod config;
pub mod order_app;
pub mod telemetry;

pub use config::*;
pub use order_app::*;
pub use telemetry::*;
