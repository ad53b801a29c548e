//! MessageGateway trait — the abstraction over the chat channel.
//!
//! A gateway posts text commands into one configured channel and reads back
//! the most recent messages. It is deliberately infallible at this boundary:
//! a transport hiccup must never abort an unattended loop, so reads degrade
//! to an empty list and writes to [`DeliveryOutcome::Unknown`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::message::Message;

/// What is known about a posted command after the request returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The API acknowledged the message.
    Delivered,
    /// Transport failed or returned a non-success status; the command may or
    /// may not be visible in the channel.
    Unknown,
}

impl DeliveryOutcome {
    pub fn is_delivered(self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

/// The core gateway trait.
///
/// Implementations handle authentication, headers, and payload decoding.
/// Callers treat "no data" exactly like "no signal found".
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Human-readable gateway name (e.g., "discord", "scripted").
    fn name(&self) -> &str;

    /// Send one text command to the configured channel.
    ///
    /// Does not wait for any reply to appear.
    async fn post_command(&self, text: &str) -> DeliveryOutcome;

    /// Fetch up to `limit` most recent messages, newest first.
    ///
    /// Returns an empty vec on any transport failure.
    async fn fetch_recent(&self, limit: u8) -> Vec<Message>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_outcome_serialization() {
        let json = serde_json::to_string(&DeliveryOutcome::Unknown).unwrap();
        assert_eq!(json, "\"unknown\"");
        assert!(DeliveryOutcome::Delivered.is_delivered());
        assert!(!DeliveryOutcome::Unknown.is_delivered());
    }
}
