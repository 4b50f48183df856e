use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use handoff_bench::{Collector, SampleSet};
use handoff_common::HandoffError;
use tokio::time::timeout;

const WAIT_TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn test_append_keeps_insertion_order() {
    let collector = Collector::new(4);
    for v in [30, 10, 40, 20] {
        collector.append(v).unwrap();
    }
    assert_eq!(collector.values(), vec![30, 10, 40, 20]);
    assert_eq!(collector.len(), 4);
}

#[test]
fn test_completion_fires_exactly_at_target() {
    let collector = Collector::new(3);
    assert!(!collector.is_complete());
    collector.append(1).unwrap();
    collector.append(2).unwrap();
    assert!(!collector.is_complete());
    collector.append(3).unwrap();
    assert!(collector.is_complete());
}

#[test]
fn test_append_past_target_is_rejected() {
    let collector = Collector::new(2);
    collector.append(1).unwrap();
    collector.append(2).unwrap();
    assert_eq!(collector.append(3), Err(HandoffError::CollectorOverflow(2)));
    // The rejected sample is not stored.
    assert_eq!(collector.values(), vec![1, 2]);
    assert!(collector.is_complete());
}

#[test]
fn test_finish_requires_every_sample() {
    let collector = Collector::new(3);
    collector.append(5).unwrap();
    assert_eq!(
        collector.finish().unwrap_err(),
        HandoffError::Incomplete { expected: 3, recorded: 1 }
    );
    collector.append(6).unwrap();
    collector.append(7).unwrap();
    let samples = collector.finish().unwrap();
    assert_eq!(samples.values(), &[5, 6, 7]);
}

#[tokio::test]
async fn test_wait_complete_releases_every_waiter() {
    let collector = Arc::new(Collector::new(3));

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let collector = Arc::clone(&collector);
            tokio::spawn(async move { collector.wait_complete().await })
        })
        .collect();

    // Append from a plain thread, the way the dedicated-worker strategies do.
    let writer = {
        let collector = Arc::clone(&collector);
        std::thread::spawn(move || {
            for v in 0..3 {
                collector.append(v).unwrap();
            }
        })
    };

    for waiter in waiters {
        timeout(WAIT_TIMEOUT, waiter)
            .await
            .expect("waiter was not released")
            .expect("waiter task panicked")
            .expect("wait_complete failed");
    }
    writer.join().unwrap();
}

#[tokio::test]
async fn test_wait_complete_after_completion_returns_immediately() {
    let collector = Collector::new(1);
    collector.append(9).unwrap();
    timeout(WAIT_TIMEOUT, collector.wait_complete())
        .await
        .expect("late waiter was not released")
        .unwrap();
}

#[tokio::test]
async fn test_wait_complete_blocks_until_target() {
    let collector = Collector::new(2);
    collector.append(1).unwrap();
    assert!(timeout(Duration::from_millis(50), collector.wait_complete()).await.is_err());
}

#[test]
fn test_concurrent_appends_are_all_recorded() {
    let collector = Arc::new(Collector::new(400));
    let writers: Vec<_> = (0..4)
        .map(|t| {
            let collector = Arc::clone(&collector);
            std::thread::spawn(move || {
                for i in 0..100 {
                    collector.append(t * 1_000 + i).unwrap();
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }
    assert!(collector.is_complete());
    let mut values = collector.values();
    values.sort_unstable();
    values.dedup();
    assert_eq!(values.len(), 400);
}

#[test]
fn test_sample_set_caches_stats_and_bins() {
    let samples = SampleSet::from_values(vec![40, 10, 30, 20]);
    let first = samples.stats() as *const _;
    let second = samples.stats() as *const _;
    assert_eq!(first, second, "stats should be computed once");
    assert_eq!(samples.stats().p50, 25);
    assert_eq!(samples.stats().count, 4);
    assert_eq!(samples.bins().iter().map(|b| b.count).sum::<usize>(), 4);
    assert_eq!(samples.bins().as_ptr(), samples.bins().as_ptr());
    // Receipt order is preserved; only the derived stats are sorted.
    assert_eq!(samples.values(), &[40, 10, 30, 20]);
}

#[test]
fn test_sample_set_with_bin_count() {
    let values: Vec<u64> = (0..100).collect();
    let default_bins = SampleSet::from_values(values.clone());
    assert_eq!(default_bins.bins().len(), 10);

    let fixed = SampleSet::from_values(values).with_bin_count(NonZeroUsize::new(4).unwrap());
    assert_eq!(fixed.bins().len(), 4);
    assert_eq!(fixed.bins().iter().map(|b| b.count).sum::<usize>(), 100);
}

#[test]
fn test_sample_set_percentile() {
    let samples = SampleSet::from_values(vec![10, 20, 30, 40]);
    assert_eq!(samples.percentile(0.5), Ok(25));
    assert!(matches!(samples.percentile(-0.1), Err(HandoffError::InvalidArgument(_))));
}

#[test]
fn test_empty_sample_set() {
    let samples = SampleSet::from_values(Vec::new());
    assert!(samples.is_empty());
    assert_eq!(samples.stats().count, 0);
    assert!(samples.bins().is_empty());
}
