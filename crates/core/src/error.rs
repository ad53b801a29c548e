//! Error types for the gemfarm domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// Failures talking to the messaging API.
///
/// These never cross the [`MessageGateway`](crate::channel::MessageGateway)
/// boundary: gateway implementations log them and degrade to an empty result.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("API request failed with status {status_code}: {message}")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),

    #[error("Alert delivery failed via {notifier}: {reason}")]
    DeliveryFailed { notifier: String, reason: String },
}
