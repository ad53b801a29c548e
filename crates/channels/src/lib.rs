//! Transport implementations for gemfarm.
//!
//! Available implementations:
//! - **Discord** — REST gateway for one channel's messages
//! - **Notifiers** — console banner, Discord DM, and fan-out composite

pub mod discord;
pub mod notify;

pub use discord::{DiscordConfig, DiscordGateway};
pub use notify::{CompositeNotifier, DiscordDmNotifier, LogNotifier};
