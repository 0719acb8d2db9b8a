use std::sync::Arc;
use std::time::Duration;

use log::trace;
use tokio_util::sync::CancellationToken;

/// Delays an action until calls stop arriving for `delay`.
///
/// Each [`Debouncer::call`] cancels whatever call is still waiting and
/// schedules a new one, so only the arguments of the last call in a burst
/// ever reach the action. Nothing is queued and nothing is returned to the
/// caller. Dropping the debouncer cancels the pending call.
///
/// Calls must be made from inside a tokio runtime.
pub struct Debouncer<A: Send + 'static> {
    delay: Duration,
    action: Arc<dyn Fn(A) + Send + Sync>,
    pending: Option<CancellationToken>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            delay,
            action: Arc::new(action),
            pending: None,
        }
    }

    pub fn call(&mut self, args: A) {
        if let Some(previous) = self.pending.take() {
            trace!("Debounce: superseding pending call");
            previous.cancel();
        }

        let token = CancellationToken::new();
        let delay = self.delay;
        let action = Arc::clone(&self.action);
        let cancelled = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    action(args);
                }
            }
        });

        self.pending = Some(token);
    }
}

impl<A: Send + 'static> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_debouncer(delay_ms: u64) -> (Debouncer<u32>, Arc<Mutex<Vec<u32>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(Duration::from_millis(delay_ms), move |n| {
            sink.lock().unwrap().push(n);
        });
        (debouncer, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_call() {
        let (mut debouncer, calls) = recording_debouncer(300);

        for n in 1..=5 {
            debouncer.call(n);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(*calls.lock().unwrap(), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_separated_by_quiet_period_both_run() {
        let (mut debouncer, calls) = recording_debouncer(300);

        debouncer.call(1);
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.call(2);
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*calls.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_runs_before_delay() {
        let (mut debouncer, calls) = recording_debouncer(300);

        debouncer.call(7);
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(calls.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*calls.lock().unwrap(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_call() {
        let (mut debouncer, calls) = recording_debouncer(300);

        debouncer.call(1);
        drop(debouncer);
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert!(calls.lock().unwrap().is_empty());
    }
}
