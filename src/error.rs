use thiserror::Error;

/// Failures talking to the orders backend.
///
/// The `Display` text is meant to be shown to the user as-is.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Cannot reach the orders service at {0}")]
    Unreachable(String),
    #[error("Request to {0} timed out")]
    Timeout(String),
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("Not found (HTTP 404): {0}")]
    NotFound(String),
    #[error("Orders service error (HTTP {status}): {message}")]
    Status { status: u16, message: String },
    #[error("Unexpected response from the orders service (HTTP {0})")]
    UnexpectedStatus(u16),
    #[error("Invalid response from the orders service: {0}")]
    Decode(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// Failures restoring, creating or clearing the current session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please enter a name")]
    EmptyName,
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Corrupt session file: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Failures reported by the order view service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0} is already in progress")]
    Busy(String),
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Order view communication error: {0}")]
    ServiceClosed(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
