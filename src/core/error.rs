use std::any::Any;

use thiserror::Error;

use crate::core::topics::TopicName;

/// Diagnostics produced while dispatching.
///
/// None of these are ever returned to a publisher. They are rendered into
/// `tracing` events at the point where they occur.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("empty publish to topic '{topic}'")]
    EmptyPublish { topic: TopicName },

    #[error("topic '{topic}' has no subscriber")]
    NoSubscriber { topic: TopicName },

    #[error("topic '{topic}' failed to consume message '{message}': {detail}")]
    HandlerFailure {
        topic: TopicName,
        message: String,
        detail: String,
    },
}

impl DispatchError {
    pub fn handler_failure(
        topic: impl Into<TopicName>,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        DispatchError::HandlerFailure {
            topic: topic.into(),
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// Returns the topic the diagnostic refers to.
    pub fn topic(&self) -> &str {
        match self {
            DispatchError::EmptyPublish { topic }
            | DispatchError::NoSubscriber { topic }
            | DispatchError::HandlerFailure { topic, .. } => topic,
        }
    }
}

/// Turns a panic payload into a readable detail string.
pub(crate) fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        format!("handler panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("handler panicked: {msg}")
    } else {
        "handler panicked: unknown panic".to_string()
    }
}
