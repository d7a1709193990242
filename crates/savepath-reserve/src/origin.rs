//! Origin execution context.
//!
//! The origin is the context that owns decision state (the UI side). Work that
//! finishes on a probe worker is not allowed to touch that state directly; it
//! posts a task to the origin's run queue instead, and whoever drives the
//! `OriginContext` runs it.

use tokio::sync::mpsc;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable handle used to post tasks to an origin context.
#[derive(Clone)]
pub struct OriginHandle {
    tx: mpsc::UnboundedSender<Task>,
}

impl OriginHandle {
    /// Queue `task` to run on the origin.
    ///
    /// Returns `false` if the origin context has been dropped, in which case
    /// `task` is dropped without running.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(Box::new(task)).is_ok()
    }

    /// Whether the origin context is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl std::fmt::Debug for OriginHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Run queue for one origin context.
///
/// Tasks run in the order they were posted, one at a time, on whichever
/// task drives the context.
pub struct OriginContext {
    tx: mpsc::UnboundedSender<Task>,
    rx: mpsc::UnboundedReceiver<Task>,
}

impl OriginContext {
    /// Create an empty run queue.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// A handle for posting to this context.
    pub fn handle(&self) -> OriginHandle {
        OriginHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run every task that is already queued, without waiting.
    ///
    /// Returns how many tasks ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait for the next task and run it.
    pub async fn run_next(&mut self) {
        // The context keeps its own sender, so the channel never closes here.
        if let Some(task) = self.rx.recv().await {
            task();
        }
    }

    /// Run tasks forever. Use as the body of the origin's event loop.
    pub async fn run(mut self) {
        loop {
            self.run_next().await;
        }
    }
}

impl Default for OriginContext {
    fn default() -> Self {
        Self::new()
    }
}
