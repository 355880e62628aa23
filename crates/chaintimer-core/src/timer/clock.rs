//! Periodic tick subscriptions.
//!
//! A [`Clock`] hands out [`SubscriptionId`]s. Whoever drives the sequencer
//! feeds each delivered id back through `Sequencer::on_tick`, which drops ids
//! that are no longer live. This replaces a callback closure with a plain
//! token so the sequencer never has to be shared with the scheduler.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::ClockError;

/// Handle for one periodic subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Scheduler collaborator: invoke a tick once per `period` until cancelled.
pub trait Clock {
    fn schedule(&mut self, period: Duration) -> Result<SubscriptionId, ClockError>;

    /// Cancel a subscription. Unknown or already-cancelled ids are ignored.
    fn cancel(&mut self, id: SubscriptionId);
}

/// Deterministic clock for tests and scripted runs.
///
/// Nothing fires on its own: the caller drives ticks by calling
/// `Sequencer::tick` / `on_tick` with ids taken from [`ManualClock::live`].
#[derive(Debug, Default)]
pub struct ManualClock {
    next_id: u64,
    live: Vec<SubscriptionId>,
    scheduled: usize,
    cancelled: usize,
    last_period: Option<Duration>,
    refuse: bool,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `schedule` call fail until switched back.
    pub fn set_refuse(&mut self, refuse: bool) {
        self.refuse = refuse;
    }

    pub fn live(&self) -> &[SubscriptionId] {
        &self.live
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn schedule_count(&self) -> usize {
        self.scheduled
    }

    pub fn cancel_count(&self) -> usize {
        self.cancelled
    }

    pub fn last_period(&self) -> Option<Duration> {
        self.last_period
    }
}

impl Clock for ManualClock {
    fn schedule(&mut self, period: Duration) -> Result<SubscriptionId, ClockError> {
        if self.refuse {
            return Err(ClockError::Refused("manual clock set to refuse".into()));
        }
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.live.push(id);
        self.scheduled += 1;
        self.last_period = Some(period);
        Ok(id)
    }

    fn cancel(&mut self, id: SubscriptionId) {
        let before = self.live.len();
        self.live.retain(|live| *live != id);
        if self.live.len() != before {
            self.cancelled += 1;
        }
    }
}

/// Clock backed by tokio tasks.
///
/// Each subscription is a spawned task that sends its id on the channel
/// returned by [`TokioClock::new`] every period, starting one period after
/// scheduling. Cancelling aborts the task; ids already queued in the channel
/// are filtered out by the sequencer.
#[derive(Debug)]
pub struct TokioClock {
    ticks: mpsc::UnboundedSender<SubscriptionId>,
    tasks: HashMap<SubscriptionId, JoinHandle<()>>,
    next_id: u64,
}

impl TokioClock {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SubscriptionId>) {
        let (ticks, rx) = mpsc::unbounded_channel();
        let clock = Self {
            ticks,
            tasks: HashMap::new(),
            next_id: 0,
        };
        (clock, rx)
    }

    pub fn live_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Clock for TokioClock {
    fn schedule(&mut self, period: Duration) -> Result<SubscriptionId, ClockError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ClockError::NoRuntime)?;
        if period.is_zero() {
            return Err(ClockError::Refused("tick period must be non-zero".into()));
        }

        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let ticks = self.ticks.clone();
        let task = runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(id).is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(id, task);
        Ok(id)
    }

    fn cancel(&mut self, id: SubscriptionId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
        }
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_tracks_live_subscriptions() {
        let mut clock = ManualClock::new();
        let a = clock.schedule(Duration::from_secs(1)).unwrap();
        let b = clock.schedule(Duration::from_secs(1)).unwrap();
        assert_ne!(a, b);
        assert_eq!(clock.live_count(), 2);

        clock.cancel(a);
        clock.cancel(a);
        assert_eq!(clock.live(), &[b]);
        assert_eq!(clock.cancel_count(), 1);
        assert_eq!(clock.schedule_count(), 2);
    }

    #[test]
    fn manual_clock_can_refuse() {
        let mut clock = ManualClock::new();
        clock.set_refuse(true);
        assert!(clock.schedule(Duration::from_secs(1)).is_err());
        assert_eq!(clock.live_count(), 0);
    }

    #[test]
    fn tokio_clock_needs_runtime() {
        let (mut clock, _rx) = TokioClock::new();
        assert_eq!(
            clock.schedule(Duration::from_secs(1)),
            Err(ClockError::NoRuntime)
        );
    }

    #[tokio::test]
    async fn tokio_clock_delivers_and_cancels() {
        let (mut clock, mut rx) = TokioClock::new();
        let id = clock.schedule(Duration::from_millis(10)).unwrap();
        assert_eq!(rx.recv().await, Some(id));
        assert_eq!(rx.recv().await, Some(id));

        clock.cancel(id);
        assert_eq!(clock.live_count(), 0);
        drop(clock);
        // Sender side is gone once the task is aborted and the clock dropped.
        while rx.recv().await.is_some() {}
    }
}
