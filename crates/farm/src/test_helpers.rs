//! Scripted gateway and recording notifier for unit tests.

use async_trait::async_trait;
use gemfarm_core::channel::{DeliveryOutcome, MessageGateway};
use gemfarm_core::message::Message;
use gemfarm_core::notify::Notifier;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Replays queued fetch results, then a fixed fallback window.
pub struct ScriptedGateway {
    queued: Mutex<VecDeque<Vec<Message>>>,
    fallback: Vec<Message>,
    posted: Mutex<Vec<String>>,
    fetch_limits: Mutex<Vec<u8>>,
    fail_posts: AtomicBool,
}

impl ScriptedGateway {
    pub fn new(fallback: Vec<Message>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            posted: Mutex::new(Vec::new()),
            fetch_limits: Mutex::new(Vec::new()),
            fail_posts: AtomicBool::new(false),
        }
    }

    pub fn queue_fetch(&self, messages: Vec<Message>) {
        self.queued.lock().unwrap().push_back(messages);
    }

    /// Every post reports `Unknown` from now on.
    pub fn fail_posts(&self) {
        self.fail_posts.store(true, Ordering::SeqCst);
    }

    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_limits.lock().unwrap().len()
    }

    pub fn fetch_limits(&self) -> Vec<u8> {
        self.fetch_limits.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn post_command(&self, text: &str) -> DeliveryOutcome {
        if self.fail_posts.load(Ordering::SeqCst) {
            return DeliveryOutcome::Unknown;
        }
        self.posted.lock().unwrap().push(text.to_string());
        DeliveryOutcome::Delivered
    }

    async fn fetch_recent(&self, limit: u8) -> Vec<Message> {
        self.fetch_limits.lock().unwrap().push(limit);
        let next = self.queued.lock().unwrap().pop_front();
        let mut messages = next.unwrap_or_else(|| self.fallback.clone());
        messages.truncate(limit as usize);
        messages
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}
