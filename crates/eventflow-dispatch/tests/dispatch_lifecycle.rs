//! End-to-end dispatcher scenarios: derived streams, owners coming and
//! going, and posting from many threads.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use eventflow_dispatch::config::{DispatchConfig, PanicPolicy};
use eventflow_dispatch::{
    DispatchError, Event, EventDispatcher, Flow, FlowConfig, Order, OwnerId,
};

#[derive(Debug, Clone)]
struct BlockPlaced {
    player: &'static str,
    block: u32,
    cancelled: Arc<AtomicBool>,
}

impl BlockPlaced {
    fn new(player: &'static str, block: u32) -> Self {
        Self {
            player,
            block,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Event for BlockPlaced {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct Tick(u64);

impl Event for Tick {}

#[test]
fn test_protection_plugin_lifecycle() {
    let dispatcher = EventDispatcher::new();
    let protection = OwnerId::new("protection");

    // Cancels placements of bedrock before anyone else reacts.
    let guard = dispatcher
        .flow::<BlockPlaced>(&protection)
        .order(Order::Pre);
    guard.subscribe(|event| {
        if event.block == 7 {
            event.cancelled.store(true, Ordering::SeqCst);
        }
    });

    let statistics = dispatcher.flow::<BlockPlaced>("statistics").order(Order::Post);
    let accepted = statistics
        .map(|event| (event.player, event.is_cancelled()))
        .fold(0_usize, |count, (_, cancelled)| count + usize::from(!cancelled));

    assert_eq!(dispatcher.post(BlockPlaced::new("alex", 1)), Ok(false));
    assert_eq!(dispatcher.post(BlockPlaced::new("alex", 7)), Ok(true));
    assert_eq!(accepted.last_value(), Some(1));

    assert_eq!(dispatcher.unregister_owner(&protection), 1);
    assert_eq!(dispatcher.post(BlockPlaced::new("sam", 7)), Ok(false));
    assert_eq!(accepted.last_value(), Some(2));
}

#[test]
fn test_zip_pairs_events_from_two_phases() {
    let dispatcher = EventDispatcher::new();
    let before = dispatcher.flow::<Tick>("a").before_modifications(true);
    let after = dispatcher.flow::<Tick>("a");

    let pairs = before.zip(&after);
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    pairs.subscribe(move |pair| {
        let (Tick(x), Tick(y)) = pair.into_inner();
        sink.lock().unwrap().push((x, y));
    });

    for n in 0..3 {
        dispatcher.post(Tick(n)).expect("post should succeed");
    }

    assert_eq!(*received.lock().unwrap(), vec![(0, 0), (1, 1), (2, 2)]);
}

#[test]
fn test_choose_tags_event_types() {
    let dispatcher = EventDispatcher::new();
    let ticks = dispatcher.flow::<Tick>("a");
    let blocks = dispatcher.flow::<BlockPlaced>("a");
    let tagged = ticks.choose(&blocks).map(|either| either.is_left());
    let sides = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&sides);
    tagged.subscribe_with(move |left| sink.lock().unwrap().push(left), false);

    dispatcher.post(Tick(1)).expect("post should succeed");
    dispatcher.post(BlockPlaced::new("alex", 3)).expect("post should succeed");

    assert_eq!(*sides.lock().unwrap(), vec![true, false]);
}

#[test]
fn test_concurrent_posts_are_all_delivered() {
    let dispatcher = EventDispatcher::new();
    let total = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&total);
    dispatcher.register("counter", move |Tick(n)| {
        counter.fetch_add(n as usize, Ordering::SeqCst);
    });
    let sum = dispatcher.flow::<Tick>("summer").fold(0_u64, |acc, Tick(n)| acc + n);

    thread::scope(|scope| {
        for _ in 0..4 {
            let dispatcher = dispatcher.clone();
            scope.spawn(move || {
                for _ in 0..250 {
                    dispatcher.post(Tick(1)).expect("post should succeed");
                }
            });
        }
    });

    assert_eq!(total.load(Ordering::SeqCst), 1_000);
    assert_eq!(sum.last_value(), Some(1_000));
}

#[test]
fn test_registration_races_with_posting() {
    let dispatcher = EventDispatcher::new();
    let stop = Arc::new(AtomicBool::new(false));

    thread::scope(|scope| {
        let poster = dispatcher.clone();
        let posting = Arc::clone(&stop);
        scope.spawn(move || {
            while !posting.load(Ordering::SeqCst) {
                poster.post(Tick(0)).expect("post should succeed");
            }
        });

        let mut ids = Vec::new();
        for i in 0..100 {
            let config = FlowConfig::new(Order::ALL[i % Order::ALL.len()], i % 2 == 0);
            ids.push(dispatcher.register_with("racer", config, |_: Tick| {}));
        }
        for id in ids {
            assert!(dispatcher.unregister(id));
        }
        stop.store(true, Ordering::SeqCst);
    });

    assert_eq!(dispatcher.active_registrations(), 0);
}

#[test]
fn test_propagate_policy_from_loaded_config() {
    let dispatcher = EventDispatcher::with_config(DispatchConfig {
        panic_policy: PanicPolicy::Propagate,
        default_order: Order::Late,
    });
    dispatcher.register("broken", |_: Tick| panic!("tick handler broke"));
    dispatcher.register("broken", |_: Tick| panic!("tick handler broke again"));

    match dispatcher.post(Tick(0)) {
        Err(DispatchError::ListenerPanicked {
            failed,
            first_panic,
            ..
        }) => {
            assert_eq!(failed, 2);
            assert_eq!(first_panic, "tick handler broke");
        }
        other => panic!("expected a listener panic, got {other:?}"),
    }
    assert_eq!(
        dispatcher.node::<Tick>(FlowConfig::new(Order::Late, false)).subscriber_count(),
        2
    );
}
