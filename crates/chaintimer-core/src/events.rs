use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, SequencerView};

/// Every state change the sequencer performs produces an Event.
/// Commands that turn out to be no-ops produce none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    IntervalQueued {
        index: usize,
        planned_secs: u32,
        queue_len: usize,
        at: DateTime<Utc>,
    },
    SequenceStarted {
        index: usize,
        remaining_secs: u32,
        /// True when the run picked up a stalled interval instead of
        /// starting from the top.
        resumed: bool,
        at: DateTime<Utc>,
    },
    /// An interval ran out on its own.
    IntervalCompleted {
        index: usize,
        label: String,
        cue_ok: bool,
        at: DateTime<Utc>,
    },
    /// The active interval was skipped; its remaining time stays parked on it.
    IntervalSkipped {
        index: usize,
        label: String,
        parked_secs: u32,
        at: DateTime<Utc>,
    },
    IntervalRepeated {
        source_index: usize,
        inserted_index: usize,
        label: String,
        planned_secs: u32,
        at: DateTime<Utc>,
    },
    IntervalActivated {
        index: usize,
        label: String,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SequenceFinished {
        intervals: usize,
        at: DateTime<Utc>,
    },
    SequenceReset {
        cleared: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        view: SequencerView,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::IntervalQueued { .. } => "interval_queued",
            Event::SequenceStarted { .. } => "sequence_started",
            Event::IntervalCompleted { .. } => "interval_completed",
            Event::IntervalSkipped { .. } => "interval_skipped",
            Event::IntervalRepeated { .. } => "interval_repeated",
            Event::IntervalActivated { .. } => "interval_activated",
            Event::SequenceFinished { .. } => "sequence_finished",
            Event::SequenceReset { .. } => "sequence_reset",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
