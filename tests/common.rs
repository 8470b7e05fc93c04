use std::sync::Once;
use std::time::Duration;

use localmq::metrics::StatsSnapshot;
use localmq::LocalMessageQueue;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = localmq::logging::init_logging_with(&localmq::config::LoggingConfig {
            filter: "localmq=debug".to_string(),
            ansi: false,
        });
    });
}

/// Polls the dispatcher's counters until `pred` holds or `limit` elapses.
#[allow(dead_code)]
pub async fn wait_for_stats<F>(mq: &LocalMessageQueue, limit: Duration, pred: F) -> StatsSnapshot
where
    F: Fn(&StatsSnapshot) -> bool,
{
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        let snap = mq.stats();
        if pred(&snap) || tokio::time::Instant::now() >= deadline {
            return snap;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
