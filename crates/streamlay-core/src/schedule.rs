use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A delayed task that is replaced, not queued, when armed again.
#[derive(Debug, Default)]
pub struct DebouncedTask {
    handle: Option<JoinHandle<()>>,
}

impl DebouncedTask {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Runs `task` after `delay`, aborting whatever was armed before.
    pub fn arm<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Returns true if a task was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DebouncedTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_pending_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut task = DebouncedTask::new();

        task.arm(Duration::from_millis(200), counter_task(&counter));
        tokio::time::sleep(Duration::from_millis(150)).await;
        task.arm(Duration::from_millis(200), counter_task(&counter));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!task.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut task = DebouncedTask::new();

        task.arm(Duration::from_millis(50), counter_task(&counter));
        assert!(task.cancel());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!task.cancel());
    }
}
