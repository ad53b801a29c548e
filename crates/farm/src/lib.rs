//! # gemfarm Farm
//!
//! The automation itself: challenge detection, buff upkeep from the
//! inventory, and the paced loop that ties them to a [`MessageGateway`].
//!
//! [`MessageGateway`]: gemfarm_core::channel::MessageGateway

pub mod cadence;
pub mod challenge;
pub mod resources;
pub mod scheduler;

#[cfg(test)]
mod test_helpers;

pub use cadence::{BreaksDue, CycleState, human_duration, sample_delay};
pub use challenge::{ChallengeDetector, DetectorState, WaitOutcome};
pub use resources::{ActiveCategorySet, InventorySnapshot, ResourceEngine};
pub use scheduler::{FarmLoop, IterationReport, MaintenanceOutcome, RunSummary};

/// Errors raised while assembling the farm loop.
#[derive(Debug, thiserror::Error)]
pub enum FarmError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
