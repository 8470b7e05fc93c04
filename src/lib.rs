//! localmq – an in-process, topic-based publish/subscribe dispatcher.
//!
//! This crate exports
//!  * `core`    – topic registry, handlers and the fire-and-forget dispatcher
//!  * `config`  – TOML-driven runtime configuration
//!  * `logging` – `tracing` subscriber setup
//!  * `metrics` – per-dispatcher delivery counters
//!
//! Producers push string messages tagged with a topic; exactly one handler per
//! topic is invoked for every message on a shared worker pool. Nothing is
//! persisted and nothing is acknowledged: failures end up in the log.

// ───────────────────────────────────────────────────────────
// Public modules
// ───────────────────────────────────────────────────────────
pub mod config;
pub mod core;
pub mod logging;
pub mod metrics;

// ───────────────────────────────────────────────────────────
// Re-exports
// ───────────────────────────────────────────────────────────
pub use crate::config::{load_config, Config};
pub use crate::core::dispatcher::{LocalMessageQueue, WeakLocalMessageQueue};
pub use crate::core::error::DispatchError;
pub use crate::core::queue::MessageQueue;
pub use crate::core::topics::{Handler, TopicName, TopicRegistry};
