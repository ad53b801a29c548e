//! # gemfarm Core
//!
//! Domain types, traits, and error definitions for the gemfarm automation loop.
//! This crate has **no transport dependencies**: it defines the domain model
//! that the gateway, notifier, and farm crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping the Discord transport for a scripted one in tests
//! - Injecting alert delivery without the loop knowing how it is delivered
//! - Clean dependency graph (all crates depend inward on core)

pub mod channel;
pub mod error;
pub mod event;
pub mod message;
pub mod notify;
pub mod resource;

// Re-export key types at crate root for ergonomics
pub use channel::{DeliveryOutcome, MessageGateway};
pub use error::{GatewayError, NotifyError};
pub use event::{EventBus, FarmEvent};
pub use message::{Embed, EmbedAuthor, EmbedField, Message};
pub use notify::{Notifier, NoopNotifier};
pub use resource::{CategoryTable, ResourceCategory, ResourceId};
