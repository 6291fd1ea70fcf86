use std::future::Future;
use tracing::{error, info};

/// Runs named cleanup tasks concurrently during shutdown.
///
/// ```ignore
/// let mut cleanup = CleanupCoordinator::new();
/// cleanup.add_task("mongodb", async move { client.shutdown().await });
/// cleanup.add_task("redis", async move { drop(redis) });
/// cleanup.run().await;
/// ```
#[derive(Default)]
pub struct CleanupCoordinator {
    tasks: Vec<(&'static str, tokio::task::JoinHandle<()>)>,
}

impl CleanupCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` immediately; [`run`](Self::run) waits for it.
    pub fn add_task<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push((name, tokio::spawn(task)));
    }

    /// Waits for every task. A panicking task is logged and does not stop the others.
    pub async fn run(self) {
        info!(count = self.tasks.len(), "Running cleanup tasks");

        for (name, handle) in self.tasks {
            match handle.await {
                Ok(()) => info!(task = name, "Cleanup task completed"),
                Err(e) => error!(task = name, error = %e, "Cleanup task failed"),
            }
        }
    }
}
