//! The flow contract and its operator algebra.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use eventflow_types::{Either, Tuple};
use parking_lot::{Mutex, ReentrantMutex};

use crate::callback_flow::CallbackFlow;
use crate::executor::Executor;

/// A push-based stream of `A` values.
///
/// Implementors supply [`subscribe_with`](Flow::subscribe_with) and
/// [`last_value`](Flow::last_value); every operator is built on top of them.
/// An operator returns a new [`CallbackFlow`] and wires it to its source(s)
/// with one internal subscription each. The wiring is permanent.
///
/// Internal wiring subscribes with replay, so a derived node starts from the
/// source's cached value if it has one. After construction, operators only
/// react to pushes; they never read a source's cached value again.
pub trait Flow<A: Clone + Send + 'static>: Send + Sync {
    /// Registers `callback` for every future push.
    ///
    /// With `replay_last`, the cached last value (if any) is delivered to the
    /// callback before this returns and before any later push reaches it.
    fn subscribe_with<F>(&self, callback: F, replay_last: bool)
    where
        F: Fn(A) + Send + Sync + 'static;

    /// Returns the most recently pushed value, or `None` if nothing has been
    /// pushed. Never waits for a delivery in progress.
    fn last_value(&self) -> Option<A>;

    /// Registers `callback` and replays the cached last value to it.
    fn subscribe<F>(&self, callback: F)
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        self.subscribe_with(callback, true);
    }

    /// Re-delivers every value through `executor` instead of on the pushing
    /// thread.
    ///
    /// Ordering between pushes is preserved only if the executor runs tasks
    /// in submission order (see [`SerialExecutor`](crate::SerialExecutor)).
    fn async_on<E>(&self, executor: E) -> CallbackFlow<A>
    where
        E: Executor,
    {
        let hopped = CallbackFlow::new();
        let downstream = hopped.clone();
        self.subscribe(move |a| {
            let downstream = downstream.clone();
            executor.execute(Box::new(move || downstream.emit(a)));
        });
        log_wiring("async");
        hopped
    }

    /// Accumulates pushes into a running value.
    ///
    /// The returned flow holds `initial` as its last value immediately. Each
    /// upstream push `a` emits `folder(accumulated, a)`, which becomes the new
    /// accumulated value.
    fn fold<B, F>(&self, initial: B, folder: F) -> CallbackFlow<B>
    where
        B: Clone + Send + 'static,
        F: Fn(B, A) -> B + Send + Sync + 'static,
    {
        let folded = CallbackFlow::with_initial(initial.clone());
        let downstream = folded.clone();
        let accumulated = Mutex::new(initial);
        self.subscribe(move |a| {
            let next = {
                let mut acc = accumulated.lock();
                let next = folder(acc.clone(), a);
                *acc = next.clone();
                next
            };
            downstream.emit(next);
        });
        log_wiring("fold");
        folded
    }

    /// Combines consecutive pushes pairwise.
    ///
    /// Nothing is emitted for the first push. The second push emits
    /// `reducer(first, second)`; every later push emits
    /// `reducer(previous_result, value)`.
    fn reduce<F>(&self, reducer: F) -> CallbackFlow<A>
    where
        F: Fn(A, A) -> A + Send + Sync + 'static,
    {
        let reduced = CallbackFlow::new();
        let downstream = reduced.clone();
        let previous: Mutex<Option<A>> = Mutex::new(None);
        self.subscribe(move |a| {
            let next = {
                let mut previous = previous.lock();
                match previous.clone() {
                    None => {
                        *previous = Some(a);
                        None
                    }
                    Some(prev) => {
                        let result = reducer(prev, a);
                        *previous = Some(result.clone());
                        Some(result)
                    }
                }
            };
            if let Some(result) = next {
                downstream.emit(result);
            }
        });
        log_wiring("reduce");
        reduced
    }

    /// Emits `function(a)` for every push `a`.
    fn map<B, F>(&self, function: F) -> CallbackFlow<B>
    where
        B: Clone + Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let mapped = CallbackFlow::new();
        let downstream = mapped.clone();
        self.subscribe(move |a| downstream.emit(function(a)));
        log_wiring("map");
        mapped
    }

    /// Maps every push to an inner flow and merges all inner flows into one.
    ///
    /// Each inner flow is subscribed with replay and stays subscribed for the
    /// lifetime of the output node.
    fn flat_map<B, G, F>(&self, function: F) -> CallbackFlow<B>
    where
        B: Clone + Send + 'static,
        G: Flow<B>,
        F: Fn(A) -> G + Send + Sync + 'static,
    {
        let flattened = CallbackFlow::new();
        let downstream = flattened.clone();
        self.subscribe(move |a| {
            let sink = downstream.clone();
            function(a).subscribe(move |b| sink.emit(b));
        });
        log_wiring("flat_map");
        flattened
    }

    /// Emits the pushes of both flows in arrival order.
    fn merge<B, O>(&self, other: &O) -> CallbackFlow<A>
    where
        B: Into<A> + Clone + Send + 'static,
        O: Flow<B>,
    {
        let merged = CallbackFlow::new();
        let left = merged.clone();
        self.subscribe(move |a| left.emit(a));
        let right = merged.clone();
        other.subscribe(move |b: B| right.emit(b.into()));
        log_wiring("merge");
        merged
    }

    /// Emits the pushes of both flows, tagged with the side they came from.
    fn choose<B, O>(&self, other: &O) -> CallbackFlow<Either<A, B>>
    where
        B: Clone + Send + 'static,
        O: Flow<B>,
    {
        let chosen = CallbackFlow::new();
        let left = chosen.clone();
        self.subscribe(move |a| left.emit(Either::Left(a)));
        let right = chosen.clone();
        other.subscribe(move |b| right.emit(Either::Right(b)));
        log_wiring("choose");
        chosen
    }

    /// Pairs the n-th push of this flow with the n-th push of `other`.
    ///
    /// Unmatched pushes wait in a FIFO buffer for their partner. Pairs are
    /// emitted while the buffers are still locked, so they reach the output
    /// in index order even when the two sources are pushed from different
    /// threads.
    fn zip<B, O>(&self, other: &O) -> CallbackFlow<Tuple<A, B>>
    where
        B: Clone + Send + 'static,
        O: Flow<B>,
    {
        let zipped = CallbackFlow::new();
        let buffers = Arc::new(ReentrantMutex::new(RefCell::new(ZipBuffers::new())));

        let left_buffers = Arc::clone(&buffers);
        let left = zipped.clone();
        self.subscribe(move |a| {
            let guard = left_buffers.lock();
            let pair = guard.borrow_mut().offer_left(a);
            if let Some(pair) = pair {
                left.emit(pair);
            }
        });

        let right = zipped.clone();
        other.subscribe(move |b| {
            let guard = buffers.lock();
            let pair = guard.borrow_mut().offer_right(b);
            if let Some(pair) = pair {
                right.emit(pair);
            }
        });
        log_wiring("zip");
        zipped
    }

    /// Discards the first `n` pushes and forwards everything after.
    fn skip(&self, n: usize) -> CallbackFlow<A> {
        let skipped = CallbackFlow::new();
        let downstream = skipped.clone();
        let remaining = AtomicUsize::new(n);
        self.subscribe(move |a| {
            let dropped = remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| r.checked_sub(1))
                .is_ok();
            if !dropped {
                downstream.emit(a);
            }
        });
        log_wiring("skip");
        skipped
    }
}

/// Merges a flow of flows into a single flow.
///
/// Equivalent to `flow.flat_map(|inner| inner)`.
pub fn flatten<A, G, O>(flow: &O) -> CallbackFlow<A>
where
    A: Clone + Send + 'static,
    G: Flow<A> + Clone + 'static,
    O: Flow<G>,
{
    flow.flat_map(|inner: G| inner)
}

fn log_wiring(operator: &'static str) {
    tracing::debug!(operator, "wired derived flow");
}

/// Unmatched items waiting on either side of a zip.
///
/// At most one side is non-empty at any time: an arriving item either pairs
/// with the head of the other side or joins the back of its own side.
pub(crate) struct ZipBuffers<A, B> {
    left: VecDeque<A>,
    right: VecDeque<B>,
}

impl<A, B> ZipBuffers<A, B> {
    pub(crate) fn new() -> Self {
        Self {
            left: VecDeque::new(),
            right: VecDeque::new(),
        }
    }

    pub(crate) fn offer_left(&mut self, a: A) -> Option<Tuple<A, B>> {
        let pair = match self.right.pop_front() {
            Some(b) => Some(Tuple::new(a, b)),
            None => {
                self.left.push_back(a);
                None
            }
        };
        debug_assert!(self.left.is_empty() || self.right.is_empty());
        pair
    }

    pub(crate) fn offer_right(&mut self, b: B) -> Option<Tuple<A, B>> {
        let pair = match self.left.pop_front() {
            Some(a) => Some(Tuple::new(a, b)),
            None => {
                self.right.push_back(b);
                None
            }
        };
        debug_assert!(self.left.is_empty() || self.right.is_empty());
        pair
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> (usize, usize) {
        (self.left.len(), self.right.len())
    }
}
