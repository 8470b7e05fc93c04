//! Queue abstraction producers and consumers program against.

use futures::future::{self, BoxFuture, FutureExt};

use crate::core::topics::Handler;

/// Common interface for message queue backends.
///
/// Implementations never report delivery outcome to the caller: publishing,
/// subscribing and unsubscribing always succeed from the caller's point of view.
pub trait MessageQueue: Send + Sync {
    /// Schedules one handler invocation per message and returns immediately.
    #[track_caller]
    fn publish(&self, topic: &str, messages: Vec<String>);

    /// Same as [`publish`](Self::publish); the returned future is already complete.
    #[track_caller]
    fn publish_async(&self, topic: &str, messages: Vec<String>) -> BoxFuture<'static, ()> {
        self.publish(topic, messages);
        future::ready(()).boxed()
    }

    /// Binds `handler` to `topic`, replacing any existing binding.
    fn subscribe(&self, topic: &str, handler: Handler);

    /// Removes the binding for `topic`; no-op if there is none.
    fn unsubscribe(&self, topic: &str);
}
