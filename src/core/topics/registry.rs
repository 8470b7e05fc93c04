use dashmap::DashMap;
use tracing::debug;

use crate::core::topics::{Handler, TopicName};

/// [`TopicRegistry`] is a thread-safe store binding each topic to exactly one handler.
///
/// Uses DashMap internally: operations on the same key are serialized by the
/// key's shard lock, operations on different keys proceed independently.
#[derive(Debug, Default)]
pub struct TopicRegistry {
    topics: DashMap<TopicName, Handler>,
}

impl TopicRegistry {
    /// Creates a new empty [`TopicRegistry`].
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
        }
    }

    /// Binds `handler` to `name`, replacing any previous binding.
    ///
    /// Returns the handler that was replaced, if any.
    pub fn bind(&self, name: impl Into<TopicName>, handler: Handler) -> Option<Handler> {
        let name = name.into();
        let previous = self.topics.insert(name.clone(), handler);
        if previous.is_some() {
            debug!(target: "localmq::registry", topic = %name, "Replaced handler");
        }
        previous
    }

    /// Removes the binding for `name`.
    ///
    /// Returns `Some(handler)` if it was bound, or `None` if not found.
    pub fn unbind(&self, name: &str) -> Option<Handler> {
        self.topics.remove(name).map(|(_, handler)| handler)
    }

    /// Looks up the handler bound to `name`.
    ///
    /// The returned clone stays valid even if the binding changes afterwards.
    pub fn get(&self, name: &str) -> Option<Handler> {
        self.topics.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.topics.contains_key(name)
    }

    /// Lists all topic names currently bound.
    pub fn topics(&self) -> Vec<TopicName> {
        self.topics
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn clear(&self) {
        self.topics.clear();
    }
}
