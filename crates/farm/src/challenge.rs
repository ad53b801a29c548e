//! Challenge detector: notices verification prompts and waits them out.
//!
//! Two states: **Clear** and **Blocked**. A check scans a bounded window of
//! recent messages (bodies plus every embed's title, description, fields and
//! author) for any configured keyword. While blocked, [`ChallengeDetector::wait_until_clear`]
//! re-checks on a fixed interval until the prompt is gone or the maximum wait
//! elapses. Either way the detector ends up Clear: the next iteration's check
//! catches a challenge that is still there.

use gemfarm_config::ChallengeSettings;
use gemfarm_core::channel::MessageGateway;
use gemfarm_core::message::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Floor for the re-check interval while blocked.
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Clear,
    Blocked,
}

/// How a challenge pause ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The challenge text disappeared.
    Cleared { waited: Duration },
    /// The maximum wait elapsed; resuming optimistically.
    TimedOut { waited: Duration },
}

impl WaitOutcome {
    pub fn waited(&self) -> Duration {
        match self {
            WaitOutcome::Cleared { waited } | WaitOutcome::TimedOut { waited } => *waited,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, WaitOutcome::TimedOut { .. })
    }
}

/// Bookkeeping for one blocking wait.
#[derive(Debug, Clone, Copy)]
struct PauseWindow {
    started: Instant,
    max_wait: Duration,
    poll_interval: Duration,
}

impl PauseWindow {
    fn open(max_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            started: Instant::now(),
            max_wait,
            poll_interval,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn remaining(&self) -> Duration {
        self.max_wait.saturating_sub(self.elapsed())
    }

    fn expired(&self) -> bool {
        self.elapsed() >= self.max_wait
    }

    /// Never sleep past the end of the window.
    fn next_sleep(&self) -> Duration {
        self.poll_interval.min(self.remaining())
    }
}

/// Everything a check looks at in one message, lowercased and space-joined.
pub fn message_haystack(msg: &Message) -> String {
    let mut text = msg.content.to_lowercase();
    for embed in &msg.embeds {
        for part in [embed.description_text(), embed.title_text()] {
            text.push(' ');
            text.push_str(&part.to_lowercase());
        }
        for field in &embed.fields {
            text.push(' ');
            text.push_str(&field.name.to_lowercase());
            text.push(' ');
            text.push_str(&field.value.to_lowercase());
        }
        text.push(' ');
        text.push_str(&embed.author_text().to_lowercase());
    }
    text
}

/// Whether any message contains any keyword. Keywords must be lowercase.
pub fn contains_challenge(messages: &[Message], keywords: &[String]) -> bool {
    messages.iter().any(|msg| {
        let haystack = message_haystack(msg);
        keywords
            .iter()
            .any(|k| !k.is_empty() && haystack.contains(k.as_str()))
    })
}

pub struct ChallengeDetector {
    gateway: Arc<dyn MessageGateway>,
    keywords: Vec<String>,
    fetch_limit: u8,
    poll_interval: Duration,
    state: DetectorState,
}

impl ChallengeDetector {
    pub fn new(
        gateway: Arc<dyn MessageGateway>,
        keywords: impl IntoIterator<Item = String>,
        fetch_limit: u8,
        poll_interval: Duration,
    ) -> Self {
        Self {
            gateway,
            keywords: keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            fetch_limit,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            state: DetectorState::Clear,
        }
    }

    pub fn from_settings(gateway: Arc<dyn MessageGateway>, settings: &ChallengeSettings) -> Self {
        Self::new(
            gateway,
            settings.keywords.iter().cloned(),
            settings.fetch_limit,
            settings.poll_interval(),
        )
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Fetch the recent window and scan it. Updates the detector state.
    ///
    /// A failed fetch reads as "no challenge".
    pub async fn is_challenge_present(&mut self) -> bool {
        let messages = self.gateway.fetch_recent(self.fetch_limit).await;
        let present = contains_challenge(&messages, &self.keywords);
        self.state = if present {
            DetectorState::Blocked
        } else {
            DetectorState::Clear
        };
        debug!(scanned = messages.len(), present, "Challenge check");
        present
    }

    /// Poll until the challenge is gone or `max_wait` elapses.
    ///
    /// With `max_wait` of zero this performs exactly one check.
    pub async fn wait_until_clear(&mut self, max_wait: Duration) -> WaitOutcome {
        let window = PauseWindow::open(max_wait, self.poll_interval);
        info!(
            max_wait_mins = max_wait.as_secs() / 60,
            poll_secs = self.poll_interval.as_secs(),
            "Paused until the challenge is resolved"
        );

        loop {
            if !self.is_challenge_present().await {
                let waited = window.elapsed();
                info!(
                    waited_secs = waited.as_secs(),
                    "Challenge resolved, resuming"
                );
                return WaitOutcome::Cleared { waited };
            }

            if window.expired() {
                let waited = window.elapsed();
                self.state = DetectorState::Clear;
                warn!(
                    waited_secs = waited.as_secs(),
                    "Challenge wait timed out, resuming anyway"
                );
                return WaitOutcome::TimedOut { waited };
            }

            debug!(
                remaining_mins = window.remaining().as_secs() / 60,
                "Challenge still active"
            );
            tokio::time::sleep(window.next_sleep()).await;
        }
    }
}
