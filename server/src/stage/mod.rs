cfg_if! {
    if #[cfg(feature = "tokio_stage")] {
        mod tokio_stage;
        pub use tokio_stage::TokioStage;
    }
}

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs deferred observer dispatch and `pull_down` off the transport thread.
///
/// Implementations must never run a task inline within `execute`.
pub trait WorkerStage: Send + Sync {
    fn execute(&self, task: Task);
}
