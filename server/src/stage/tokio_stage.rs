use tokio::runtime::Handle;

use super::{Task, WorkerStage};

/// Runs tasks on a tokio runtime's blocking pool, so observer callbacks may block
#[derive(Clone)]
pub struct TokioStage {
    handle: Handle,
}

impl TokioStage {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Binds to the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl WorkerStage for TokioStage {
    fn execute(&self, task: Task) {
        // the JoinHandle is detached; tasks report through the session
        drop(self.handle.spawn_blocking(task));
    }
}
