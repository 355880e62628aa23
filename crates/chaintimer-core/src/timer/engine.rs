//! Interval sequencer.
//!
//! The sequencer is a tick-driven state machine over an ordered interval
//! queue. It owns no threads: a [`Clock`] hands out periodic subscriptions and
//! the caller feeds each delivered tick back through [`Sequencer::on_tick`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Running(next) | Finished) -> Running (replay)
//! any  -> Idle (reset)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut seq = Sequencer::new(clock, cue, presenter);
//! seq.enqueue(90);
//! seq.start();
//! // For every tick delivered by the clock:
//! seq.on_tick(id);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::clock::{Clock, SubscriptionId};
use super::cue::CueEmitter;
use super::interval::{Interval, IntervalQueue};
use super::view::{IntervalRow, Permissions, Presenter, SequencerView};
use crate::error::ClockError;
use crate::events::Event;

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Most events the outbox keeps between drains.
pub const EVENT_BACKLOG: usize = 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Finished,
}

/// Sequencer over an interval queue.
///
/// `Running` holds exactly when a clock subscription is live. Every mutating
/// command refreshes the presenter before returning.
///
/// Events are also kept in an outbox for [`drain_events`](Self::drain_events).
/// The outbox holds at most [`EVENT_BACKLOG`] entries; an embedder that never
/// drains it loses the oldest ones first.
#[derive(Debug)]
pub struct Sequencer<C, E, P> {
    queue: IntervalQueue,
    active_index: usize,
    /// Countdown for the active interval. Drops to -1 for the instant the
    /// boundary is detected.
    remaining_secs: i64,
    phase: Phase,
    subscription: Option<SubscriptionId>,
    tick_period: Duration,
    events: VecDeque<Event>,
    clock: C,
    cue: E,
    presenter: P,
}

impl<C: Clock, E: CueEmitter, P: Presenter> Sequencer<C, E, P> {
    pub fn new(clock: C, cue: E, presenter: P) -> Self {
        Self {
            queue: IntervalQueue::new(),
            active_index: 0,
            remaining_secs: 0,
            phase: Phase::Idle,
            subscription: None,
            tick_period: TICK_PERIOD,
            events: VecDeque::new(),
            clock,
            cue,
            presenter,
        }
    }

    /// Override the tick period. Takes effect on the next subscription.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn queue(&self) -> &IntervalQueue {
        &self.queue
    }

    /// Index of the interval counting down, if any.
    pub fn active_index(&self) -> Option<usize> {
        (self.phase == Phase::Running).then_some(self.active_index)
    }

    /// Raw cursor, including the resting position outside a run.
    pub fn cursor(&self) -> usize {
        self.active_index
    }

    /// Raw countdown value; -1 only inside a boundary transition.
    pub fn remaining_secs(&self) -> i64 {
        self.remaining_secs
    }

    /// Countdown clamped for display.
    pub fn display_secs(&self) -> u32 {
        u32::try_from(self.remaining_secs.max(0)).unwrap_or(u32::MAX)
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn cue(&self) -> &E {
        &self.cue
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Consume the sequencer, cancelling any live subscription, and hand
    /// back the presenter.
    pub fn into_presenter(mut self) -> P {
        self.unsubscribe();
        self.presenter
    }

    pub fn permissions(&self) -> Permissions {
        let running = self.phase == Phase::Running;
        let can_repeat = running
            && self
                .queue
                .get(self.active_index)
                .is_some_and(|i| !i.repeated_already());
        Permissions {
            enqueue: true,
            start: !running && !self.queue.is_empty(),
            reset: true,
            duplicate: can_repeat,
            skip: running && !self.queue.is_empty(),
        }
    }

    /// Project current state for presentation.
    pub fn view(&self) -> SequencerView {
        let active = self.active_index();
        let remaining = self.display_secs();
        let rows = self
            .queue
            .iter()
            .zip(self.queue.labels())
            .enumerate()
            .map(|(index, (interval, label))| {
                let is_active = active == Some(index);
                IntervalRow {
                    label,
                    is_active,
                    displayed_secs: if is_active {
                        remaining
                    } else {
                        interval.remaining_at_rest()
                    },
                    planned_secs: interval.planned_secs(),
                }
            })
            .collect();

        SequencerView {
            phase: self.phase,
            rows,
            remaining_secs: remaining,
            active_index: active,
            permissions: self.permissions(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            view: self.view(),
            at: Utc::now(),
        }
    }

    /// Take every event recorded since the last drain, oldest first.
    ///
    /// This includes follow-up transitions (activation of the next interval,
    /// end of the run) that commands do not return directly.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append an interval. Non-positive durations are ignored.
    pub fn enqueue(&mut self, secs: i64) -> Option<Event> {
        let secs = u32::try_from(secs).ok()?;
        let interval = Interval::new(secs)?;
        self.queue.push(interval);
        debug!(secs, len = self.queue.len(), "interval queued");
        self.refresh();
        Some(self.record(Event::IntervalQueued {
            index: self.queue.len() - 1,
            planned_secs: secs,
            queue_len: self.queue.len(),
            at: Utc::now(),
        }))
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.phase == Phase::Running || self.queue.is_empty() {
            return None;
        }

        let from_top = self.active_index == 0 && self.remaining_secs == 0;
        if !from_top && self.active_index >= self.queue.len() {
            self.active_index = 0;
            self.remaining_secs = 0;
            return self.start();
        }

        if let Err(err) = self.subscribe() {
            warn!(error = %err, "could not schedule ticks; start ignored");
            return None;
        }

        if from_top {
            self.queue.restore_all();
            self.remaining_secs = self
                .queue
                .get(0)
                .map(|i| i64::from(i.planned_secs()))
                .unwrap_or(0);
        }
        self.phase = Phase::Running;
        debug!(
            index = self.active_index,
            remaining = self.remaining_secs,
            resumed = !from_top,
            "sequence started"
        );
        self.refresh();
        Some(self.record(Event::SequenceStarted {
            index: self.active_index,
            remaining_secs: self.display_secs(),
            resumed: !from_top,
            at: Utc::now(),
        }))
    }

    /// Tick delivered by the clock. Ticks from cancelled subscriptions are
    /// dropped.
    pub fn on_tick(&mut self, id: SubscriptionId) -> Option<Event> {
        if self.subscription != Some(id) {
            debug!(%id, "stale tick ignored");
            return None;
        }
        self.tick()
    }

    /// Advance the countdown by one period.
    ///
    /// Returns `Some(IntervalCompleted)` when the active interval runs out.
    /// The boundary is one period after `0` has been shown.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != Phase::Running {
            return None;
        }

        self.remaining_secs -= 1;
        if self.remaining_secs >= 0 {
            self.refresh();
            return None;
        }

        self.unsubscribe();
        let index = self.active_index;
        let label = self.queue.display_label(index).unwrap_or_default();
        let cue_ok = self.emit_cue();
        let event = self.record(Event::IntervalCompleted {
            index,
            label,
            cue_ok,
            at: Utc::now(),
        });
        self.active_index += 1;
        self.advance();
        Some(event)
    }

    /// Insert a fresh copy of the active interval right after it.
    ///
    /// Each interval can be repeated once.
    pub fn duplicate_active(&mut self) -> Option<Event> {
        if self.phase != Phase::Running {
            return None;
        }
        let source_index = self.active_index;
        let inserted_index = self.queue.duplicate_after(source_index)?;
        let interval = self.queue.get(inserted_index)?;
        let label = interval.label().unwrap_or_default().to_string();
        let planned_secs = interval.planned_secs();
        debug!(source_index, inserted_index, %label, "interval repeated");
        self.refresh();
        Some(self.record(Event::IntervalRepeated {
            source_index,
            inserted_index,
            label,
            planned_secs,
            at: Utc::now(),
        }))
    }

    /// Move on to the next interval without a cue, parking the remaining
    /// time on the skipped one.
    pub fn skip_active(&mut self) -> Option<Event> {
        if self.phase != Phase::Running || self.queue.is_empty() {
            return None;
        }

        self.unsubscribe();
        let index = self.active_index;
        let parked_secs = self.display_secs();
        let label = self.queue.display_label(index).unwrap_or_default();
        if let Some(interval) = self.queue.get_mut(index) {
            interval.park(parked_secs);
        }
        let event = self.record(Event::IntervalSkipped {
            index,
            label,
            parked_secs,
            at: Utc::now(),
        });
        self.active_index += 1;
        self.advance();
        Some(event)
    }

    /// Drop every interval and return to `Idle`.
    pub fn reset(&mut self) -> Option<Event> {
        self.unsubscribe();
        let cleared = self.queue.len();
        self.queue.clear();
        self.active_index = 0;
        self.remaining_secs = 0;
        self.phase = Phase::Idle;
        debug!(cleared, "sequence reset");
        self.refresh();
        Some(self.record(Event::SequenceReset {
            cleared,
            at: Utc::now(),
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) {
        let Some(next) = self.queue.get(self.active_index) else {
            self.finish();
            return;
        };
        self.remaining_secs = i64::from(next.remaining_at_rest());

        if let Err(err) = self.subscribe() {
            // Stall: keep the cursor so a later start resumes here.
            warn!(
                error = %err,
                index = self.active_index,
                "could not schedule ticks; sequence stalled"
            );
            self.phase = Phase::Idle;
            self.refresh();
            return;
        }

        let label = self
            .queue
            .display_label(self.active_index)
            .unwrap_or_default();
        debug!(index = self.active_index, %label, remaining = self.remaining_secs, "interval activated");
        self.record(Event::IntervalActivated {
            index: self.active_index,
            label,
            remaining_secs: self.display_secs(),
            at: Utc::now(),
        });
        self.refresh();
    }

    fn finish(&mut self) {
        self.unsubscribe();
        self.phase = Phase::Finished;
        self.remaining_secs = 0;
        self.active_index = 0;
        debug!(intervals = self.queue.len(), "sequence finished");
        self.record(Event::SequenceFinished {
            intervals: self.queue.len(),
            at: Utc::now(),
        });
        self.refresh();
    }

    fn subscribe(&mut self) -> Result<(), ClockError> {
        self.unsubscribe();
        let id = self.clock.schedule(self.tick_period)?;
        self.subscription = Some(id);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.clock.cancel(id);
        }
    }

    fn emit_cue(&mut self) -> bool {
        match self.cue.emit() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "boundary cue failed; continuing");
                false
            }
        }
    }

    fn refresh(&mut self) {
        let view = self.view();
        self.presenter.refresh(&view);
    }

    fn record(&mut self, event: Event) -> Event {
        if self.events.len() >= EVENT_BACKLOG {
            self.events.pop_front();
        }
        self.events.push_back(event.clone());
        event
    }
}
