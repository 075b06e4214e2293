//! Tests for the bounded parallel processor: failure isolation, retry
//! budget per item, the concurrency ceiling, aggregate totals.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use feedback_jobs::error::Error;
use feedback_jobs::exec::{BatchTotals, BoundedParallel};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Failure isolation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn failing_item_is_isolated_and_retried_to_exhaustion() {
    let calls: Arc<Mutex<HashMap<String, u32>>> = Arc::new(Mutex::new(HashMap::new()));

    let processor = BoundedParallel::new(4);
    let cancel = CancellationToken::new();

    let counted = Arc::clone(&calls);
    let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let totals = processor
        .process(
            items,
            move |item: String| {
                let counted = Arc::clone(&counted);
                async move {
                    *counted.lock().unwrap().entry(item.clone()).or_insert(0) += 1;
                    if item == "b" {
                        Err(Error::Other("b always fails".to_string()))
                    } else {
                        Ok(())
                    }
                }
            },
            &cancel,
        )
        .await;

    // The call itself never raises; the bad item is just counted.
    assert_eq!(
        totals,
        BatchTotals {
            processed: 2,
            failed: 1
        }
    );

    // Item b burned its full three-attempt budget; the others ran once.
    let calls = calls.lock().unwrap();
    assert_eq!(calls.get("a"), Some(&1));
    assert_eq!(calls.get("b"), Some(&3));
    assert_eq!(calls.get("c"), Some(&1));
}

#[tokio::test(start_paused = true)]
async fn all_items_succeeding_counts_everything_processed() {
    let processor = BoundedParallel::new(3);
    let cancel = CancellationToken::new();

    let items: Vec<u64> = (0..10).collect();
    let totals = processor
        .process(items, |_item: u64| async { Ok(()) }, &cancel)
        .await;

    assert_eq!(
        totals,
        BatchTotals {
            processed: 10,
            failed: 0
        }
    );
}

#[tokio::test(start_paused = true)]
async fn empty_batch_resolves_with_zero_totals() {
    let processor = BoundedParallel::new(3);
    let cancel = CancellationToken::new();

    let totals = processor
        .process(Vec::<u64>::new(), |_item: u64| async { Ok(()) }, &cancel)
        .await;

    assert_eq!(totals, BatchTotals::default());
}

// ---------------------------------------------------------------------------
// Admission gate
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn in_flight_operations_never_exceed_the_ceiling() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let processor = BoundedParallel::new(5);
    let cancel = CancellationToken::new();

    let gauge = Arc::clone(&in_flight);
    let high_water = Arc::clone(&max_seen);
    let items: Vec<u64> = (0..20).collect();
    let totals = processor
        .process(
            items,
            move |_item: u64| {
                let gauge = Arc::clone(&gauge);
                let high_water = Arc::clone(&high_water);
                async move {
                    let now = gauge.fetch_add(1, Ordering::SeqCst) + 1;
                    high_water.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    gauge.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            },
            &cancel,
        )
        .await;

    assert_eq!(totals.processed, 20);
    assert!(max_seen.load(Ordering::SeqCst) <= 5);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn cancelled_token_cuts_retries_short_but_still_resolves() {
    let calls = Arc::new(AtomicUsize::new(0));

    let processor = BoundedParallel::new(2);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let counted = Arc::clone(&calls);
    let items = vec!["x".to_string(), "y".to_string()];
    let totals = processor
        .process(
            items,
            move |_item: String| {
                let counted = Arc::clone(&counted);
                async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Err(Error::Other("down".to_string()))
                }
            },
            &cancel,
        )
        .await;

    // Each item fails once, the backoff wait is skipped, and the batch
    // still resolves with counts instead of raising.
    assert_eq!(
        totals,
        BatchTotals {
            processed: 0,
            failed: 2
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn rerun_with_same_inputs_yields_identical_totals() {
    let processor = BoundedParallel::new(3);
    let cancel = CancellationToken::new();

    for _ in 0..2 {
        let items: Vec<u64> = (0..7).collect();
        let totals = processor
            .process(
                items,
                |item: u64| async move {
                    if item % 3 == 0 {
                        Err(Error::Other("multiple of three".to_string()))
                    } else {
                        Ok(())
                    }
                },
                &cancel,
            )
            .await;
        // 0, 3, 6 exhaust their retries every run.
        assert_eq!(
            totals,
            BatchTotals {
                processed: 4,
                failed: 3
            }
        );
    }
}
