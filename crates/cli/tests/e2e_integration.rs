//! End-to-end tests for the gemfarm farm loop.
//!
//! These drive the real loop from a config file through a scripted channel,
//! with tokio's clock paused so challenge pauses and breaks run instantly.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use gemfarm_config::AppConfig;
use gemfarm_core::channel::{DeliveryOutcome, MessageGateway};
use gemfarm_core::event::{BreakKind, EventBus, FarmEvent};
use gemfarm_core::message::{Embed, Message};
use gemfarm_core::notify::{NoopNotifier, Notifier};
use gemfarm_core::resource::ResourceId;
use gemfarm_farm::{FarmLoop, MaintenanceOutcome};
use rand::SeedableRng;
use rand::rngs::StdRng;

// ── Scripted channel ────────────────────────────────────────────────────

/// Serves queued fetch windows first, then a fixed window forever.
struct ScriptedChannel {
    queued: Mutex<VecDeque<Vec<Message>>>,
    window: Vec<Message>,
    posted: Mutex<Vec<String>>,
}

impl ScriptedChannel {
    fn new(window: Vec<Message>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            window,
            posted: Mutex::new(Vec::new()),
        }
    }

    fn then(self, messages: Vec<Message>) -> Self {
        self.queued.lock().unwrap().push_back(messages);
        self
    }

    fn posted(&self) -> Vec<String> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MessageGateway for ScriptedChannel {
    fn name(&self) -> &str {
        "e2e_channel"
    }

    async fn post_command(&self, text: &str) -> DeliveryOutcome {
        self.posted.lock().unwrap().push(text.to_string());
        DeliveryOutcome::Delivered
    }

    async fn fetch_recent(&self, limit: u8) -> Vec<Message> {
        let mut window = self
            .queued
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.window.clone());
        window.truncate(limit as usize);
        window
    }
}

#[derive(Default)]
struct CountingNotifier {
    alerts: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl Notifier for CountingNotifier {
    fn name(&self) -> &str {
        "counting"
    }

    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

fn status(codes: &str) -> Message {
    Message::text(format!("**🌱 | farmer**, hunt is empowered by {codes}"))
}

fn inventory(listing: &str) -> Message {
    Message::with_embed(Embed::titled("farmer's Inventory").description(listing))
}

fn captcha() -> Message {
    Message::with_embed(
        Embed::titled("⚠️ Warning").description("Please complete your captcha to verify that you are human!"),
    )
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Arc<FarmEvent>>) -> Vec<Arc<FarmEvent>> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ── Tests ───────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn e2e_config_file_drives_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[channel]
channel_id = "1234567890"

[commands]
farming = ["oh"]

[[categories]]
name = "A"
index = 1
start = 10
end = 20

[[categories]]
name = "B"
index = 2
start = 20
end = 30
"#,
    )
    .unwrap();
    let config = AppConfig::load_from(&path).unwrap();

    let channel = Arc::new(ScriptedChannel::new(vec![
        inventory("`012` x1  `025` x2  `027` x1"),
        status("<:egem1:99>"),
    ]));
    let events = Arc::new(EventBus::default());
    let mut rx = events.subscribe();
    let mut farm = FarmLoop::new(&config, channel.clone(), Arc::new(NoopNotifier), events)
        .unwrap()
        .with_rng(StdRng::seed_from_u64(1));

    let report = farm.run_one_iteration().await;

    assert_eq!(
        report.maintenance,
        MaintenanceOutcome::Consumed {
            ids: vec![ResourceId(27)],
            command: "ouse 027".into(),
        }
    );
    assert_eq!(channel.posted(), vec!["oh", "oinv", "ouse 027"]);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    match events[0].as_ref() {
        FarmEvent::ResourcesConsumed { ids, command, .. } => {
            assert_eq!(ids, &vec![27]);
            assert_eq!(command, "ouse 027");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn e2e_challenge_pause_alerts_once_and_resumes() {
    let channel = Arc::new(
        ScriptedChannel::new(vec![status("<:egem1:1> <:egem2:2> <:egem3:3> <:egem4:4> <:egem5:5>")])
            .then(vec![captcha()])
            .then(vec![captcha()])
            .then(vec![captcha()]),
    );
    let notifier = Arc::new(CountingNotifier::default());
    let events = Arc::new(EventBus::default());
    let mut rx = events.subscribe();
    let mut farm = FarmLoop::new(&AppConfig::default(), channel.clone(), notifier.clone(), events)
        .unwrap()
        .with_rng(StdRng::seed_from_u64(2));

    let first = farm.run_one_iteration().await;
    let outcome = first.challenge.expect("challenge detected");
    assert!(!outcome.timed_out());
    assert_eq!(outcome.waited().as_secs(), 60);
    assert_eq!(first.maintenance, MaintenanceOutcome::AllActive);

    let second = farm.run_one_iteration().await;
    assert!(second.challenge.is_none());

    assert_eq!(notifier.alerts.lock().unwrap().len(), 1);
    assert_eq!(channel.posted(), vec!["oh", "ob", "owo", "oh", "ob", "owo"]);

    let events = drain(&mut rx);
    assert!(matches!(events[0].as_ref(), FarmEvent::ChallengeDetected { .. }));
    assert!(matches!(
        events[1].as_ref(),
        FarmEvent::ChallengeResolved {
            timed_out: false,
            waited_secs: 60,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn e2e_bounded_run_paces_and_breaks() {
    let mut config = AppConfig::default();
    config.runtime.max_runtime_minutes = Some(60);

    let channel = Arc::new(ScriptedChannel::new(vec![status(
        "<:egem1:1> <:egem2:2> <:egem3:3> <:egem4:4> <:egem5:5>",
    )]));
    let events = Arc::new(EventBus::default());
    let mut rx = events.subscribe();
    let mut farm = FarmLoop::new(&config, channel.clone(), Arc::new(NoopNotifier), events)
        .unwrap()
        .with_rng(StdRng::seed_from_u64(3));

    let started = tokio::time::Instant::now();
    let summary = farm.run().await;

    assert!(started.elapsed().as_secs() >= 3600);
    assert!(
        (40..=120).contains(&summary.iterations),
        "unexpected iteration count {}",
        summary.iterations
    );
    assert_eq!(summary.challenges, 0);
    assert_eq!(summary.consumes, 0);
    assert_eq!(channel.posted().len() as u64, summary.iterations * 3);

    let short_breaks = drain(&mut rx)
        .iter()
        .filter(|e| {
            matches!(
                e.as_ref(),
                FarmEvent::BreakScheduled {
                    kind: BreakKind::Short,
                    ..
                }
            )
        })
        .count() as u64;
    assert_eq!(short_breaks, summary.iterations / 15);
}

#[tokio::test]
async fn e2e_default_config_round_trips_through_onboard_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, AppConfig::default_toml()).unwrap();

    let loaded = AppConfig::load_from(&path).unwrap();
    let defaults = AppConfig::default();
    assert_eq!(loaded.commands.farming, defaults.commands.farming);
    assert_eq!(loaded.categories, defaults.categories);
    assert_eq!(loaded.challenge.keywords, defaults.challenge.keywords);
    assert_eq!(
        loaded.schedule.resource_check_every,
        defaults.schedule.resource_check_every
    );
    assert!(loaded.require_token().is_err());
    assert!(loaded.require_channel().is_err());
}
