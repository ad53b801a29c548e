//! The farm loop.
//!
//! One iteration:
//! 1. dispatch the farming commands
//! 2. settle, check for a challenge, pause until clear if blocked
//! 3. every Nth iteration, top up inactive buff categories
//! 4. update cadence counters and decide which breaks are due
//!
//! [`FarmLoop::run_one_iteration`] does all of that and reports the pauses
//! it wants; [`FarmLoop::run`] is the driver that sleeps them and repeats.

use chrono::Utc;
use gemfarm_config::{AppConfig, CommandSettings, ScheduleSettings};
use gemfarm_core::channel::MessageGateway;
use gemfarm_core::event::{BreakKind, EventBus, FarmEvent};
use gemfarm_core::notify::Notifier;
use gemfarm_core::resource::ResourceId;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::FarmError;
use crate::cadence::{CycleState, human_duration, sample_delay};
use crate::challenge::{ChallengeDetector, WaitOutcome};
use crate::resources::{ResourceEngine, find_inventory_text, find_status_text};

const CHALLENGE_ALERT: &str = "Challenge detected. Please verify in Discord.";

/// What the resource maintenance step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceOutcome {
    /// Not this iteration.
    NotDue,
    /// Every category already active; no inventory fetch.
    AllActive,
    /// No inventory listing found in the recent messages.
    NoInventory,
    /// Listing found but nothing owned for the inactive categories.
    NothingToConsume,
    /// Consume command dispatched.
    Consumed {
        ids: Vec<ResourceId>,
        command: String,
    },
}

/// Everything one iteration did, plus the pauses the driver must take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    pub iteration: u64,
    pub challenge: Option<WaitOutcome>,
    pub maintenance: MaintenanceOutcome,
    pub short_break: Option<Duration>,
    pub long_break: Option<Duration>,
    pub next_delay: Duration,
}

impl IterationReport {
    /// Pauses in the order they are taken.
    pub fn pauses(&self) -> Vec<(BreakKind, Duration)> {
        let mut pauses = Vec::with_capacity(3);
        if let Some(d) = self.short_break {
            pauses.push((BreakKind::Short, d));
        }
        if let Some(d) = self.long_break {
            pauses.push((BreakKind::Long, d));
        }
        pauses.push((BreakKind::Iteration, self.next_delay));
        pauses
    }
}

/// Totals returned when a bounded run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u64,
    pub challenges: u64,
    pub consumes: u64,
    pub elapsed: Duration,
}

/// The farm loop. Owns the cycle counters; nothing else touches them.
pub struct FarmLoop<R: Rng = StdRng> {
    gateway: Arc<dyn MessageGateway>,
    detector: ChallengeDetector,
    engine: ResourceEngine,
    notifier: Arc<dyn Notifier>,
    events: Arc<EventBus>,
    commands: CommandSettings,
    schedule: ScheduleSettings,
    max_challenge_wait: Duration,
    max_runtime: Option<Duration>,
    state: CycleState,
    iterations: u64,
    rng: R,
}

impl FarmLoop<StdRng> {
    pub fn new(
        config: &AppConfig,
        gateway: Arc<dyn MessageGateway>,
        notifier: Arc<dyn Notifier>,
        events: Arc<EventBus>,
    ) -> Result<Self, FarmError> {
        let engine = ResourceEngine::new(
            config.categories.clone(),
            &config.commands.active_marker,
            config.commands.consume_keyword.clone(),
        )?;

        Ok(Self {
            detector: ChallengeDetector::from_settings(gateway.clone(), &config.challenge),
            gateway,
            engine,
            notifier,
            events,
            commands: config.commands.clone(),
            schedule: config.schedule.clone(),
            max_challenge_wait: config.challenge.max_wait(),
            max_runtime: config
                .runtime
                .max_runtime_minutes
                .map(|m| Duration::from_secs(m.saturating_mul(60))),
            state: CycleState::default(),
            iterations: 0,
            rng: StdRng::from_entropy(),
        })
    }
}

impl<R: Rng> FarmLoop<R> {
    /// Swap the random source (seeded RNGs make pauses reproducible).
    pub fn with_rng<R2: Rng>(self, rng: R2) -> FarmLoop<R2> {
        FarmLoop {
            gateway: self.gateway,
            detector: self.detector,
            engine: self.engine,
            notifier: self.notifier,
            events: self.events,
            commands: self.commands,
            schedule: self.schedule,
            max_challenge_wait: self.max_challenge_wait,
            max_runtime: self.max_runtime,
            state: self.state,
            iterations: self.iterations,
            rng,
        }
    }

    /// Override the configured runtime budget.
    pub fn with_max_runtime(mut self, max_runtime: Option<Duration>) -> Self {
        self.max_runtime = max_runtime;
        self
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Run iterations until the runtime budget is spent (forever if unset).
    pub async fn run(&mut self) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::default();
        info!(
            farming = ?self.commands.farming,
            max_runtime_mins = self.max_runtime.map(|d| d.as_secs() / 60),
            "Farm loop started"
        );

        loop {
            if let Some(budget) = self.max_runtime {
                if started.elapsed() >= budget {
                    summary.elapsed = started.elapsed();
                    info!(
                        iterations = summary.iterations,
                        elapsed = %human_duration(summary.elapsed),
                        "Runtime budget reached, stopping"
                    );
                    return summary;
                }
            }

            let report = self.run_one_iteration().await;
            summary.iterations += 1;
            if report.challenge.is_some() {
                summary.challenges += 1;
            }
            if matches!(report.maintenance, MaintenanceOutcome::Consumed { .. }) {
                summary.consumes += 1;
            }

            for (kind, pause) in report.pauses() {
                match kind {
                    BreakKind::Short => info!("Short break: {}", human_duration(pause)),
                    BreakKind::Long => info!("Long break: {}", human_duration(pause)),
                    BreakKind::Iteration => {
                        info!("Waiting {} before next iteration", human_duration(pause))
                    }
                }
                tokio::time::sleep(pause).await;
            }
        }
    }

    /// Steps 1-4 of one iteration. Sleeps only for the settle delays and
    /// a challenge pause; the breaks are returned in the report.
    pub async fn run_one_iteration(&mut self) -> IterationReport {
        self.iterations += 1;
        let iteration = self.iterations;

        info!(iteration, "Sending farming commands");
        for command in &self.commands.farming {
            self.gateway.post_command(command).await;
        }

        tokio::time::sleep(Duration::from_secs(self.schedule.settle_delay_secs)).await;
        let challenge = self.handle_challenge().await;

        let maintenance = if self
            .state
            .resource_check_due(self.schedule.resource_check_every)
        {
            self.maintain_resources().await
        } else {
            MaintenanceOutcome::NotDue
        };

        let due = self.state.record_iteration(&self.schedule);
        info!(
            iteration,
            actions = self.state.actions_since_resource_check,
            messages = self.state.messages_sent_since_short_break,
            cycles = self.state.cycles_since_long_break,
            "Iteration complete"
        );

        let short_break = due
            .short_break
            .then(|| sample_delay(self.schedule.short_break, &mut self.rng));
        let long_break = due
            .long_break
            .then(|| sample_delay(self.schedule.long_break, &mut self.rng));
        let next_delay = sample_delay(self.schedule.iteration_delay, &mut self.rng);

        for (kind, pause) in [
            (BreakKind::Short, short_break),
            (BreakKind::Long, long_break),
        ] {
            if let Some(pause) = pause {
                self.events.publish(FarmEvent::BreakScheduled {
                    kind,
                    secs: pause.as_secs(),
                    timestamp: Utc::now(),
                });
            }
        }

        IterationReport {
            iteration,
            challenge,
            maintenance,
            short_break,
            long_break,
            next_delay,
        }
    }

    async fn handle_challenge(&mut self) -> Option<WaitOutcome> {
        if !self.detector.is_challenge_present().await {
            return None;
        }

        warn!("CHALLENGE DETECTED, pausing requests until it is resolved");
        self.events.publish(FarmEvent::ChallengeDetected {
            timestamp: Utc::now(),
        });
        self.notifier.alert(CHALLENGE_ALERT).await;

        let outcome = self.detector.wait_until_clear(self.max_challenge_wait).await;
        self.events.publish(FarmEvent::ChallengeResolved {
            timed_out: outcome.timed_out(),
            waited_secs: outcome.waited().as_secs(),
            timestamp: Utc::now(),
        });
        Some(outcome)
    }

    /// Consume the best owned resource of every inactive category.
    async fn maintain_resources(&self) -> MaintenanceOutcome {
        let limit = self.schedule.scan_fetch_limit;

        let recent = self.gateway.fetch_recent(limit).await;
        let active = find_status_text(&recent, &self.commands.empowered_phrase)
            .map(|text| self.engine.parse_active_categories(&text))
            .unwrap_or_default();
        info!(active = ?active.names(), "Active categories");

        let inactive = self.engine.inactive_categories(&active);
        if inactive.is_empty() {
            info!("All categories already active, nothing to use");
            return MaintenanceOutcome::AllActive;
        }
        let inactive_names: Vec<&str> = inactive.iter().map(|c| c.name.as_str()).collect();
        info!(inactive = ?inactive_names, "Inactive categories");

        self.gateway.post_command(&self.commands.inventory).await;
        tokio::time::sleep(Duration::from_secs(self.schedule.inventory_settle_secs)).await;
        let recent = self.gateway.fetch_recent(limit).await;

        let Some(listing) = find_inventory_text(&recent, &self.commands.inventory_title_markers)
        else {
            warn!("No inventory listing found");
            return MaintenanceOutcome::NoInventory;
        };

        let owned = self.engine.parse_inventory(&listing);
        info!(owned = ?owned.ids(), "Inventory parsed");

        for category in &inactive {
            let available: Vec<ResourceId> = self.engine.owned_in(&owned, category).collect();
            if let Some(best) = available.iter().max() {
                info!(
                    category = %category.name,
                    available = ?available,
                    using = %best,
                    "Selected resource"
                );
            }
        }

        let selected = self.engine.select_highest_per_category(&owned, &inactive);
        if selected.is_empty() {
            info!("No owned resources for the inactive categories");
            return MaintenanceOutcome::NothingToConsume;
        }

        let command = self.engine.format_consume_command(&selected);
        info!(command = %command, "Using resources");
        self.gateway.post_command(&command).await;
        self.events.publish(FarmEvent::ResourcesConsumed {
            ids: selected.iter().map(|id| id.0).collect(),
            command: command.clone(),
            timestamp: Utc::now(),
        });

        MaintenanceOutcome::Consumed {
            ids: selected,
            command,
        }
    }
}
