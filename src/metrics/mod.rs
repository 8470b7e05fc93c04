use std::sync::atomic::{AtomicU64, Ordering};

/// Delivery counters for one dispatcher instance.
///
/// Coarse-grained and lock-free; readers get a point-in-time [`StatsSnapshot`]
/// that may lag in-flight deliveries.
#[derive(Debug, Default)]
pub struct DispatchStats {
    scheduled: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
    dropped_no_subscriber: AtomicU64,
    empty_publishes: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Messages handed to the worker pool.
    pub scheduled: u64,
    /// Handler invocations that returned `Ok`.
    pub delivered: u64,
    /// Handler invocations that returned `Err` or panicked.
    pub failed: u64,
    /// Deliveries the pool discarded without running (runtime shut down).
    pub cancelled: u64,
    /// Messages published to a topic with no handler.
    pub dropped_no_subscriber: u64,
    /// Publish calls that carried no messages.
    pub empty_publishes: u64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_scheduled(&self, n: u64) {
        self.scheduled.fetch_add(n, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_dropped_no_subscriber(&self, n: u64) {
        self.dropped_no_subscriber.fetch_add(n, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_empty_publishes(&self) {
        self.empty_publishes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            scheduled: self.scheduled.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            dropped_no_subscriber: self.dropped_no_subscriber.load(Ordering::Relaxed),
            empty_publishes: self.empty_publishes.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Deliveries scheduled but not yet delivered, failed or cancelled.
    pub fn in_flight(&self) -> u64 {
        self.scheduled.saturating_sub(
            self.delivered
                .saturating_add(self.failed)
                .saturating_add(self.cancelled),
        )
    }

    /// Prometheus-style text without HELP/TYPE lines.
    pub fn render(&self) -> String {
        format!(
            "localmq_scheduled {}\nlocalmq_delivered {}\nlocalmq_failed {}\nlocalmq_cancelled {}\nlocalmq_dropped_no_subscriber {}\nlocalmq_empty_publishes {}\n",
            self.scheduled,
            self.delivered,
            self.failed,
            self.cancelled,
            self.dropped_no_subscriber,
            self.empty_publishes,
        )
    }
}
