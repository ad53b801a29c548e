//! Notifier trait — out-of-band alert delivery.
//!
//! The farm loop alerts a human when it detects a verification challenge.
//! How the alert travels (console banner, direct message) is not the loop's
//! concern; it only holds a `dyn Notifier`.

use async_trait::async_trait;

/// Best-effort alert capability.
///
/// `alert` has no error channel: implementations swallow and log their own
/// failures so a broken side channel can never interrupt the loop.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs (e.g., "log", "discord_dm").
    fn name(&self) -> &str;

    /// Deliver a short human-readable alert.
    async fn alert(&self, message: &str);
}

/// A notifier that drops every alert.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    fn name(&self) -> &str {
        "noop"
    }

    async fn alert(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_notifier_accepts_alerts() {
        let notifier = NoopNotifier;
        notifier.alert("challenge detected").await;
        assert_eq!(notifier.name(), "noop");
    }
}
