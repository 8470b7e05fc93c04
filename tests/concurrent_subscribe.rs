#[path = "common.rs"]
mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use localmq::{Handler, LocalMessageQueue};
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn distinct_topics_do_not_interfere() {
    common::init_logging();

    let mq = LocalMessageQueue::new();
    let mut set = JoinSet::new();

    for i in 0..16 {
        let mq = mq.clone();
        set.spawn(async move {
            for n in 0..200 {
                let topic = format!("topic-{i}");
                mq.subscribe(topic.clone(), |_| Ok(()));
                if n % 2 == 1 {
                    mq.unsubscribe(&topic);
                }
            }
        });
    }

    timeout(Duration::from_secs(5), async {
        while let Some(res) = set.join_next().await {
            res.unwrap();
        }
    })
    .await
    .expect("subscribe/unsubscribe stalled");

    // 200 iterations end on an unsubscribe for every topic.
    assert!(mq.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn racing_writers_on_one_topic_leave_a_single_binding() {
    common::init_logging();

    let mq = LocalMessageQueue::new();
    let handlers: Vec<Handler> = (0..8).map(|_| Handler::from_fn(|_| Ok(()))).collect();
    let mut set = JoinSet::new();

    for h in handlers.iter().cloned() {
        let mq = mq.clone();
        set.spawn(async move {
            for _ in 0..100 {
                mq.subscribe_handler("shared", h.clone());
                tokio::task::yield_now().await;
            }
        });
    }
    while let Some(res) = set.join_next().await {
        res.unwrap();
    }

    assert_eq!(mq.topics(), vec!["shared".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn publishes_overlap_with_rebinding() {
    common::init_logging();

    let mq = LocalMessageQueue::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let publisher = {
        let mq = mq.clone();
        tokio::spawn(async move {
            for n in 0..500 {
                mq.publish("hot", [format!("m{n}")]);
                tokio::task::yield_now().await;
            }
        })
    };

    for _ in 0..50 {
        let h = Arc::clone(&hits);
        mq.subscribe("hot", move |_| {
            h.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        tokio::task::yield_now().await;
        mq.unsubscribe("hot");
    }
    publisher.await.unwrap();

    let snap = common::wait_for_stats(&mq, Duration::from_secs(2), |s| s.in_flight() == 0).await;
    assert_eq!(snap.scheduled + snap.dropped_no_subscriber, 500);
    assert_eq!(snap.delivered as usize, hits.load(Ordering::Relaxed));
    assert_eq!(snap.failed, 0);
}
