use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Periodic refresh driver.
///
/// The task runs once immediately, then on every tick. Each tick (or
/// manual trigger) spawns one run of the task; runs are not
/// awaited by the loop, so a slow request never delays the next tick.
/// Overlapping runs are resolved by the task itself.
pub struct Poller;

impl Poller {
    pub fn start<F, Fut>(name: &'static str, every: Duration, task: F) -> PollerHandle
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let trigger = PollTrigger(Arc::new(Notify::new()));

        let loop_cancel = cancel.clone();
        let loop_trigger = trigger.clone();
        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(poller = name, every_ms = every.as_millis() as u64, "poller started");

            loop {
                tokio::select! {
                    _ = loop_cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                    _ = loop_trigger.0.notified() => {
                        debug!(poller = name, "poll triggered");
                    }
                }
                tokio::spawn(task());
            }

            debug!(poller = name, "poller stopped");
        });

        PollerHandle { cancel, trigger, join }
    }
}

/// Running poller. Stops when dropped.
pub struct PollerHandle {
    cancel: CancellationToken,
    trigger: PollTrigger,
    join: JoinHandle<()>,
}

impl PollerHandle {
    pub fn trigger(&self) -> PollTrigger {
        self.trigger.clone()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop and wait for the loop to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        let _ = (&mut self.join).await;
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Requests an immediate out-of-schedule run.
#[derive(Clone)]
pub struct PollTrigger(Arc<Notify>);

impl PollTrigger {
    pub fn fire(&self) {
        self.0.notify_one();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Fires the registered triggers when the view comes back into sight.
pub struct VisibilityWatch {
    state: Visibility,
    triggers: Vec<PollTrigger>,
}

impl VisibilityWatch {
    pub fn new(triggers: Vec<PollTrigger>) -> Self {
        Self { state: Visibility::Visible, triggers }
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    /// Returns true if the change fired a refresh.
    pub fn set(&mut self, next: Visibility) -> bool {
        let resumed = self.state == Visibility::Hidden && next == Visibility::Visible;
        self.state = next;
        if resumed {
            debug!("view visible again, refreshing");
            for trigger in &self.triggers {
                trigger.fire();
            }
        }
        resumed
    }
}
