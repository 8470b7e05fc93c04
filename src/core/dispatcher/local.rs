use std::panic::Location;
use std::sync::{Arc, Weak};

use futures::future::{self, Ready};
use tokio::runtime::Handle;
use tracing::{debug, error, Level};

use crate::config::DispatcherConfig;
use crate::core::dispatcher::WorkerPool;
use crate::core::error::DispatchError;
use crate::core::queue::MessageQueue;
use crate::core::topics::handler::{invoke_async, invoke_sync};
use crate::core::topics::{Handler, TopicName, TopicRegistry};
use crate::metrics::{DispatchStats, StatsSnapshot};

/// In-process, topic-based publish/subscribe dispatcher.
///
/// - At most one handler per topic; subscribing again replaces it.
/// - Every published message becomes its own task on the worker pool.
/// - Publishers never wait and never see failures: empty publishes and
///   unsubscribed topics are logged at debug level, handler errors and panics
///   at error level.
/// - No ordering between messages, no retries, no cancellation.
///
/// Clones are handles to the same registry, pool and counters. Handlers that
/// publish onward should capture [`downgrade`](Self::downgrade) rather than a
/// clone: a strong clone inside a bound handler keeps the dispatcher (and an
/// owned pool) alive until the topic is unbound or [`shutdown`](Self::shutdown)
/// is called.
#[derive(Clone, Debug)]
pub struct LocalMessageQueue {
    inner: Arc<Inner>,
}

/// Non-owning handle to a [`LocalMessageQueue`], for capture inside handlers.
#[derive(Clone, Debug)]
pub struct WeakLocalMessageQueue {
    inner: Weak<Inner>,
}

impl WeakLocalMessageQueue {
    /// Returns `None` once every strong handle is gone.
    pub fn upgrade(&self) -> Option<LocalMessageQueue> {
        self.inner.upgrade().map(|inner| LocalMessageQueue { inner })
    }
}

#[derive(Debug)]
struct Inner {
    registry: TopicRegistry,
    // Deliveries hold the stats, never `Inner`; only a handler upgrading a
    // weak handle can make a worker drop the pool.
    stats: Arc<DispatchStats>,
    capture_call_site: bool,
    pool: WorkerPool,
}

impl LocalMessageQueue {
    /// Creates a dispatcher on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime, like [`Handle::current`].
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self::with_pool(WorkerPool::shared(handle), cfg!(debug_assertions))
    }

    pub fn with_pool(pool: WorkerPool, capture_call_site: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: TopicRegistry::new(),
                stats: Arc::new(DispatchStats::new()),
                capture_call_site,
                pool,
            }),
        }
    }

    /// Builds a dispatcher from configuration, starting an owned pool when
    /// required (see [`WorkerPool::from_config`]).
    pub fn from_config(cfg: &DispatcherConfig) -> anyhow::Result<Self> {
        let pool = WorkerPool::from_config(cfg)?;
        Ok(Self::with_pool(pool, cfg.capture_call_site()))
    }

    pub fn downgrade(&self) -> WeakLocalMessageQueue {
        WeakLocalMessageQueue {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Binds a blocking handler to `topic`, replacing any previous one.
    pub fn subscribe<F>(&self, topic: impl Into<TopicName>, handler: F)
    where
        F: Fn(&str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe_handler(topic, Handler::from_fn(handler));
    }

    /// Binds an async handler to `topic`, replacing any previous one.
    pub fn subscribe_async<F, Fut>(&self, topic: impl Into<TopicName>, handler: F)
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.subscribe_handler(topic, Handler::from_async(handler));
    }

    pub fn subscribe_handler(&self, topic: impl Into<TopicName>, handler: Handler) {
        let topic = topic.into();
        debug!(target: "localmq::dispatcher", topic = %topic, async_handler = handler.is_async(), "Subscribed");
        self.inner.registry.bind(topic, handler);
    }

    /// Removes the handler bound to `topic`, if any.
    ///
    /// Deliveries already scheduled with the old handler still run.
    pub fn unsubscribe(&self, topic: &str) {
        if self.inner.registry.unbind(topic).is_some() {
            debug!(target: "localmq::dispatcher", topic = %topic, "Unsubscribed");
        }
    }

    /// Schedules one invocation of the topic's handler per message.
    ///
    /// Returns before any of them run. Nothing is scheduled when `messages` is
    /// empty or the topic has no handler.
    #[track_caller]
    pub fn publish<I, M>(&self, topic: &str, messages: I)
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let caller = Location::caller();
        let mut messages = messages.into_iter().peekable();

        if messages.peek().is_none() {
            self.inner.stats.inc_empty_publishes();
            self.note(caller, || DispatchError::EmptyPublish {
                topic: topic.to_owned(),
            });
            return;
        }

        let Some(handler) = self.inner.registry.get(topic) else {
            self.inner
                .stats
                .inc_dropped_no_subscriber(messages.count() as u64);
            self.note(caller, || DispatchError::NoSubscriber {
                topic: topic.to_owned(),
            });
            return;
        };

        for message in messages {
            self.deliver(topic, handler.clone(), message.into());
        }
    }

    /// Async flavour of [`publish`](Self::publish). The future is ready on
    /// first poll; it does not wait for deliveries.
    #[track_caller]
    pub fn publish_async<I, M>(&self, topic: &str, messages: I) -> Ready<()>
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.publish(topic, messages);
        future::ready(())
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.inner.registry.contains(topic)
    }

    /// Topics that currently have a handler.
    pub fn topics(&self) -> Vec<TopicName> {
        self.inner.registry.topics()
    }

    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.registry.is_empty()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Unbinds every topic and releases this handle.
    ///
    /// An owned pool stops once the last clone is gone; in-flight deliveries
    /// are not awaited.
    pub fn shutdown(self) {
        debug!(target: "localmq::dispatcher", topics = self.len(), "Shutting down dispatcher");
        self.inner.registry.clear();
    }

    fn deliver(&self, topic: &str, handler: Handler, message: String) {
        self.inner.stats.inc_scheduled(1);
        let mut ticket = Ticket {
            stats: Arc::clone(&self.inner.stats),
            settled: false,
        };
        let topic = topic.to_owned();

        match handler {
            Handler::Sync(f) => self.inner.pool.spawn_blocking(move || {
                let outcome = invoke_sync(f.as_ref(), &message);
                ticket.settle(&topic, &message, outcome);
            }),
            Handler::Async(f) => self.inner.pool.spawn(async move {
                let outcome = invoke_async(f.as_ref(), message.clone()).await;
                ticket.settle(&topic, &message, outcome);
            }),
        }
    }

    fn note<F>(&self, caller: &'static Location<'static>, diag: F)
    where
        F: FnOnce() -> DispatchError,
    {
        if !tracing::enabled!(target: "localmq::dispatcher", Level::DEBUG) {
            return;
        }
        let diag = diag();
        if self.inner.capture_call_site {
            debug!(target: "localmq::dispatcher", topic = %diag.topic(), caller = %caller, "{diag}");
        } else {
            debug!(target: "localmq::dispatcher", topic = %diag.topic(), "{diag}");
        }
    }
}

/// Accounts for one scheduled delivery.
///
/// Dropped unsettled when the pool discards the task without running it (its
/// runtime has shut down); that counts as cancelled.
struct Ticket {
    stats: Arc<DispatchStats>,
    settled: bool,
}

impl Ticket {
    fn settle(&mut self, topic: &str, message: &str, outcome: Result<(), String>) {
        self.settled = true;
        match outcome {
            Ok(()) => self.stats.inc_delivered(),
            Err(detail) => {
                self.stats.inc_failed();
                let failure = DispatchError::handler_failure(topic, message, detail.as_str());
                error!(
                    target: "localmq::dispatcher",
                    topic = %topic,
                    payload = %message,
                    error = %detail,
                    "{failure}"
                );
            }
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if !self.settled {
            self.stats.inc_cancelled();
        }
    }
}

impl MessageQueue for LocalMessageQueue {
    #[track_caller]
    fn publish(&self, topic: &str, messages: Vec<String>) {
        LocalMessageQueue::publish(self, topic, messages);
    }

    fn subscribe(&self, topic: &str, handler: Handler) {
        self.subscribe_handler(topic, handler);
    }

    fn unsubscribe(&self, topic: &str) {
        LocalMessageQueue::unsubscribe(self, topic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn publish_reaches_bound_handler() {
        let mq = LocalMessageQueue::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        mq.subscribe("greet", move |m| {
            tx.send(m.to_string())?;
            Ok(())
        });

        mq.publish("greet", ["hello"]);

        let got = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(got.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn empty_and_unsubscribed_publishes_are_counted() {
        let mq = LocalMessageQueue::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        mq.subscribe("t", move |_| {
            h.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        mq.publish("t", Vec::<String>::new());
        mq.publish("nobody", ["a", "b"]);

        let stats = mq.stats();
        assert_eq!(stats.empty_publishes, 1);
        assert_eq!(stats.dropped_no_subscriber, 2);
        assert_eq!(stats.scheduled, 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn trait_object_routes_to_inherent_methods() {
        let mq = LocalMessageQueue::new();
        let queue: Arc<dyn MessageQueue> = Arc::new(mq.clone());

        queue.subscribe("x", Handler::from_fn(|_| Ok(())));
        assert!(mq.is_subscribed("x"));

        queue.publish_async("x", vec!["m".into()]).await;
        assert_eq!(mq.stats().scheduled, 1);

        queue.unsubscribe("x");
        assert!(mq.is_empty());
    }
}
