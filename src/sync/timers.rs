use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Shortest period [`ScheduledTask::every`] will run at
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A cancellable timer slot owning at most one pending tokio task
///
/// Scheduling again replaces whatever was pending. Jobs are spawned on their
/// own once the timer fires, so cancelling only ever stops a wait, never a
/// request already on the wire.
#[derive(Debug, Default)]
pub struct ScheduledTask {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ScheduledTask {
    pub fn new() -> Self {
        Self::default()
    }

    fn replace(&self, next: Option<JoinHandle<()>>) {
        let mut slot = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *slot, next) {
            previous.abort();
        }
    }

    /// Run `job` once after `delay`, resetting any pending run
    pub fn schedule<F>(&self, delay: Duration, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(job);
        });
        self.replace(Some(handle));
    }

    /// Run `tick()` every `period`, first run one period from now
    ///
    /// A zero `period` is raised to [`MIN_PERIOD`].
    pub fn every<F, Fut>(&self, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tokio::spawn(tick());
            }
        });
        self.replace(Some(handle));
    }

    pub fn cancel(&self) {
        self.replace(None);
    }

    pub fn is_pending(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter_job(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_resets_the_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let task = ScheduledTask::new();

        task.schedule(Duration::from_millis(500), counter_job(&fired));
        tokio::time::sleep(Duration::from_millis(300)).await;
        task.schedule(Duration::from_millis(500), counter_job(&fired));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!task.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_a_pending_run() {
        let fired = Arc::new(AtomicUsize::new(0));
        let task = ScheduledTask::new();
        task.schedule(Duration::from_secs(1), counter_job(&fired));
        assert!(task.is_pending());

        task.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn every_ticks_until_dropped() {
        let fired = Arc::new(AtomicUsize::new(0));
        let task = ScheduledTask::new();
        let counter = Arc::clone(&fired);
        task.every(Duration::from_secs(30), move || counter_job(&counter));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(62)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);

        drop(task);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_still_ticks() {
        let fired = Arc::new(AtomicUsize::new(0));
        let task = ScheduledTask::new();
        let counter = Arc::clone(&fired);
        task.every(Duration::ZERO, move || counter_job(&counter));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(task.is_pending());
        assert!(fired.load(Ordering::SeqCst) >= 1);
    }
}
