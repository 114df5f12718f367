//! Cancellable repeating task.
//!
//! The next tick is scheduled only after the previous one has completed,
//! so ticks never overlap no matter how long one takes.
use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug)]
pub struct RepeatingTask {
    stop: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTask {
    /// Run `tick` now, then `period` after each tick completes, until
    /// stopped or until a tick returns `Break`.
    pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let (stop, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            loop {
                if *stopped.borrow() {
                    break;
                }
                if tick().await.is_break() {
                    debug!("repeating task finished");
                    break;
                }
                tokio::select! {
                    biased;
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(period) => {}
                }
            }
        });
        RepeatingTask {
            stop,
            handle: Some(handle),
        }
    }

    /// Cancel the pending tick. A tick already running finishes first.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Stop and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.stop.send_replace(true);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(period: Duration, work: Duration) -> (RepeatingTask, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = RepeatingTask::spawn(period, move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(work).await;
                ControlFlow::Continue(())
            }
        });
        (task, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate() {
        let (task, count) = counting(Duration::from_secs(1), Duration::ZERO);
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_period_counts_from_tick_end() {
        // tick takes 2s, period 1s: ticks start at 0, 3, 6, 9
        let (task, count) = counting(Duration::from_secs(1), Duration::from_secs(2));
        tokio::time::sleep(Duration::from_millis(9500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_tick() {
        let (task, count) = counting(Duration::from_secs(1), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        task.shutdown().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let (task, count) = counting(Duration::from_secs(1), Duration::ZERO);
        tokio::task::yield_now().await;
        drop(task);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_ends_task() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = RepeatingTask::spawn(Duration::from_secs(1), move || {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        });
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(task.is_finished());
    }
}
