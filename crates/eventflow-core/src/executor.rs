//! Execution contexts for the `async_on` hand-off.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::callback_flow::panic_message;
use crate::error::FlowError;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Something that runs tasks, possibly on another thread.
///
/// This is the only suspension point in the flow algebra: a flow produced by
/// [`Flow::async_on`](crate::Flow::async_on) submits one task per value.
/// Implementations decide where and in what order tasks run.
///
/// Any `Fn(Task) + Send + Sync + 'static` closure is an executor.
pub trait Executor: Send + Sync + 'static {
    /// Submits `task` for execution.
    fn execute(&self, task: Task);
}

impl<F> Executor for F
where
    F: Fn(Task) + Send + Sync + 'static,
{
    fn execute(&self, task: Task) {
        self(task);
    }
}

/// Runs every task immediately on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) {
        task();
    }
}

/// Spawns every task onto a tokio runtime.
///
/// Tasks may run concurrently on different worker threads, so values that
/// cross this executor can be re-ordered.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Creates an executor spawning onto `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Creates an executor for the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NoRuntime`] when called outside a tokio runtime.
    pub fn try_current() -> Result<Self, FlowError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| FlowError::NoRuntime(e.to_string()))
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: Task) {
        self.handle.spawn(async move { run_task(task) });
    }
}

/// Runs tasks one at a time, in submission order, on a dedicated tokio task.
///
/// Values crossing an `async_on` boundary backed by this executor keep their
/// push order. The queue is unbounded. When the runtime that owns the worker
/// shuts down, further submissions are dropped with a warning.
#[derive(Debug, Clone)]
pub struct SerialExecutor {
    sender: mpsc::UnboundedSender<Task>,
}

impl SerialExecutor {
    /// Starts the worker on `handle`.
    pub fn spawn(handle: &Handle) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();
        handle.spawn(async move {
            while let Some(task) = receiver.recv().await {
                run_task(task);
            }
            tracing::debug!("serial executor worker stopped");
        });
        Self { sender }
    }

    /// Starts the worker on the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NoRuntime`] when called outside a tokio runtime.
    pub fn try_current() -> Result<Self, FlowError> {
        let handle = Handle::try_current().map_err(|e| FlowError::NoRuntime(e.to_string()))?;
        Ok(Self::spawn(&handle))
    }
}

impl Executor for SerialExecutor {
    fn execute(&self, task: Task) {
        if self.sender.send(task).is_err() {
            tracing::warn!("serial executor worker is gone; dropping task");
        }
    }
}

/// Runs a task, containing any panic so the worker survives.
fn run_task(task: Task) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(task)) {
        tracing::warn!(panic = %panic_message(payload.as_ref()), "executor task panicked");
    }
}
