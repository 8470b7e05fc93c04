//! Topic module containing the topic→handler registry and handler types.

pub mod handler;
pub mod registry;

pub use handler::Handler;
pub use registry::TopicRegistry;

/// Alias for a topic name.
pub type TopicName = String;
