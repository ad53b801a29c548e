//! Cadence counters and randomized pauses.
//!
//! [`CycleState`] is a plain value: the farm loop owns the only instance and
//! feeds it one [`CycleState::record_iteration`] per iteration. Thresholds come
//! from [`ScheduleSettings`]; the state only says *that* a break is due, the
//! caller decides how long it lasts via [`sample_delay`].

use gemfarm_config::{DelayRange, ScheduleSettings};
use rand::Rng;
use std::time::Duration;

/// Counters behind the short and long break rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleState {
    pub messages_sent_since_short_break: u32,
    pub actions_since_resource_check: u32,
    pub cycles_since_long_break: u32,
}

/// Breaks triggered by one iteration's counter update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreaksDue {
    pub short_break: bool,
    pub long_break: bool,
}

impl CycleState {
    /// Whether this iteration runs the resource maintenance pass.
    ///
    /// Checked before the counters are updated, so the very first iteration
    /// and the first iteration of every cycle both qualify.
    pub fn resource_check_due(&self, every: u32) -> bool {
        every > 0 && self.actions_since_resource_check % every == 0
    }

    /// Account for one finished iteration and reset whatever fired.
    pub fn record_iteration(&mut self, schedule: &ScheduleSettings) -> BreaksDue {
        let mut due = BreaksDue::default();

        self.messages_sent_since_short_break += schedule.messages_per_iteration;
        self.actions_since_resource_check += 1;

        if self.messages_sent_since_short_break >= schedule.short_break_after_messages {
            due.short_break = true;
            self.messages_sent_since_short_break = 0;
        }

        if self.actions_since_resource_check >= schedule.actions_per_cycle {
            self.cycles_since_long_break += 1;
            self.actions_since_resource_check = 0;
        }

        if self.cycles_since_long_break >= schedule.long_break_after_cycles {
            due.long_break = true;
            self.cycles_since_long_break = 0;
        }

        due
    }
}

/// Uniformly sample whole seconds from an inclusive range.
pub fn sample_delay<R: Rng + ?Sized>(range: DelayRange, rng: &mut R) -> Duration {
    let (lo, hi) = if range.min_secs <= range.max_secs {
        (range.min_secs, range.max_secs)
    } else {
        (range.max_secs, range.min_secs)
    };
    Duration::from_secs(rng.gen_range(lo..=hi))
}

/// `1h 5m 3s` style rendering for logs.
pub fn human_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (h, m) {
        (0, 0) => format!("{s}s"),
        (0, _) => format!("{m}m {s}s"),
        _ => format!("{h}h {m}m {s}s"),
    }
}
