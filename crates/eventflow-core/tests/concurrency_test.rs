//! Concurrency tests for flow nodes.
//!
//! These tests verify that `subscribe` and `push` on the same node are
//! serialised: replay never duplicates or loses a concurrent push, and
//! values from one source keep their order through merged flows.

use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use eventflow_core::{CallbackFlow, Flow};

const PUSHES: u32 = 2_000;

/// Asserts `received` is a gap-free, duplicate-free run ending at the final push.
fn assert_contiguous_tail(received: &[u32]) {
    assert!(!received.is_empty(), "subscriber should see at least the replayed value");
    for pair in received.windows(2) {
        assert_eq!(pair[1], pair[0] + 1, "values must arrive once each, in order");
    }
    assert_eq!(*received.last().unwrap(), PUSHES - 1);
}

#[test]
fn test_replay_is_atomic_with_concurrent_push() {
    for _ in 0..20 {
        let flow: CallbackFlow<u32> = CallbackFlow::with_initial(0);
        let barrier = Arc::new(Barrier::new(2));
        let received = Arc::new(Mutex::new(Vec::new()));

        thread::scope(|scope| {
            let pusher_flow = flow.clone();
            let pusher_barrier = Arc::clone(&barrier);
            scope.spawn(move || {
                pusher_barrier.wait();
                for v in 1..PUSHES {
                    pusher_flow.push(v).expect("no subscriber panics");
                }
            });

            let subscriber_flow = flow.clone();
            let sink = Arc::clone(&received);
            scope.spawn(move || {
                barrier.wait();
                subscriber_flow.subscribe(move |v| sink.lock().unwrap().push(v));
            });
        });

        assert_contiguous_tail(&received.lock().unwrap());
    }
}

#[test]
fn test_concurrent_subscribers_each_see_contiguous_tail() {
    let flow: CallbackFlow<u32> = CallbackFlow::with_initial(0);
    let logs: Vec<Arc<Mutex<Vec<u32>>>> =
        (0..8).map(|_| Arc::new(Mutex::new(Vec::new()))).collect();

    thread::scope(|scope| {
        let pusher_flow = flow.clone();
        scope.spawn(move || {
            for v in 1..PUSHES {
                pusher_flow.push(v).expect("no subscriber panics");
            }
        });

        for log in &logs {
            let subscriber_flow = flow.clone();
            let sink = Arc::clone(log);
            scope.spawn(move || {
                subscriber_flow.subscribe(move |v| sink.lock().unwrap().push(v));
            });
        }
    });

    for log in &logs {
        assert_contiguous_tail(&log.lock().unwrap());
    }
    assert_eq!(flow.subscriber_count(), 8);
}

#[test]
fn test_merge_preserves_per_source_order_across_threads() {
    let left: CallbackFlow<(u8, u32)> = CallbackFlow::new();
    let right: CallbackFlow<(u8, u32)> = CallbackFlow::new();
    let merged = left.merge(&right);
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    merged.subscribe_with(move |v| sink.lock().unwrap().push(v), false);

    thread::scope(|scope| {
        for (tag, source) in [(0_u8, left.clone()), (1_u8, right.clone())] {
            scope.spawn(move || {
                for seq in 0..PUSHES {
                    source.push((tag, seq)).expect("no subscriber panics");
                }
            });
        }
    });

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 2 * PUSHES as usize);
    for tag in [0_u8, 1] {
        let sequence: Vec<u32> = received
            .iter()
            .filter(|(t, _)| *t == tag)
            .map(|(_, seq)| *seq)
            .collect();
        assert_eq!(sequence, (0..PUSHES).collect::<Vec<_>>());
    }
}

#[test]
fn test_concurrent_zip_pairs_every_push() {
    let left: CallbackFlow<u32> = CallbackFlow::new();
    let right: CallbackFlow<u32> = CallbackFlow::new();
    let zipped = left.zip(&right);
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    zipped.subscribe_with(move |pair| sink.lock().unwrap().push(pair.into_inner()), false);

    thread::scope(|scope| {
        for source in [left.clone(), right.clone()] {
            scope.spawn(move || {
                for seq in 0..PUSHES {
                    source.push(seq).expect("no subscriber panics");
                }
            });
        }
    });

    let received = received.lock().unwrap();
    let expected: Vec<(u32, u32)> = (0..PUSHES).map(|seq| (seq, seq)).collect();
    assert_eq!(*received, expected, "pairs arrive in index order");
}

#[test]
fn test_fold_counts_every_push_from_many_threads() {
    let source: CallbackFlow<u64> = CallbackFlow::new();
    let total = source.fold(0_u64, |acc, v| acc + v);

    thread::scope(|scope| {
        for _ in 0..4 {
            let source = source.clone();
            scope.spawn(move || {
                for _ in 0..500 {
                    source.push(1).expect("no subscriber panics");
                }
            });
        }
    });

    assert_eq!(total.last_value(), Some(2_000));
}

#[test]
fn test_reads_do_not_wait_for_a_slow_subscriber() {
    let flow: CallbackFlow<u32> = CallbackFlow::new();
    let entered = Arc::new(Barrier::new(2));
    let in_subscriber = Arc::clone(&entered);
    flow.subscribe_with(
        move |_| {
            in_subscriber.wait();
            thread::sleep(Duration::from_millis(800));
        },
        false,
    );

    thread::scope(|scope| {
        let pusher = flow.clone();
        scope.spawn(move || pusher.push(1).expect("no subscriber panics"));

        entered.wait();
        let started = Instant::now();
        let last = flow.last_value();
        let count = flow.subscriber_count();
        let waited = started.elapsed();

        assert_eq!(last, Some(1));
        assert_eq!(count, 1);
        assert!(
            waited < Duration::from_millis(100),
            "reads waited {waited:?} on an in-flight push"
        );
    });
}
