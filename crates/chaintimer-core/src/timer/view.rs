//! Read-only projection of sequencer state for presentation layers.

use serde::{Deserialize, Serialize};

use super::engine::Phase;
use super::keypad::format_clock;

/// One rendered queue row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRow {
    pub label: String,
    pub is_active: bool,
    pub displayed_secs: u32,
    pub planned_secs: u32,
}

/// Which operations currently do something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub enqueue: bool,
    pub start: bool,
    pub reset: bool,
    pub duplicate: bool,
    pub skip: bool,
}

/// Everything a presenter needs, computed from sequencer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerView {
    pub phase: Phase,
    pub rows: Vec<IntervalRow>,
    /// Clamped countdown for the active interval.
    pub remaining_secs: u32,
    pub active_index: Option<usize>,
    pub permissions: Permissions,
}

impl SequencerView {
    pub fn active_row(&self) -> Option<&IntervalRow> {
        self.active_index.and_then(|i| self.rows.get(i))
    }

    /// Main countdown display, `MM:SS`.
    pub fn clock_text(&self) -> String {
        format_clock(i64::from(self.remaining_secs))
    }

    pub fn status_line(&self) -> String {
        match self.phase {
            Phase::Idle if self.rows.is_empty() => "Waiting for intervals".to_string(),
            Phase::Idle => "Ready".to_string(),
            Phase::Running => match self.active_row() {
                Some(row) => format!("Interval {} running", row.label),
                None => "Running".to_string(),
            },
            Phase::Finished => "All intervals complete (start to replay)".to_string(),
        }
    }
}

/// Receives a fresh view after every state-mutating operation.
pub trait Presenter {
    fn refresh(&mut self, view: &SequencerView);
}

/// Presenter that ignores refreshes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn refresh(&mut self, _view: &SequencerView) {}
}

impl<T: Presenter + ?Sized> Presenter for Box<T> {
    fn refresh(&mut self, view: &SequencerView) {
        (**self).refresh(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(phase: Phase, rows: Vec<IntervalRow>, active_index: Option<usize>) -> SequencerView {
        SequencerView {
            phase,
            rows,
            remaining_secs: 75,
            active_index,
            permissions: Permissions {
                enqueue: true,
                start: false,
                reset: true,
                duplicate: false,
                skip: false,
            },
        }
    }

    fn row(label: &str, is_active: bool) -> IntervalRow {
        IntervalRow {
            label: label.into(),
            is_active,
            displayed_secs: 75,
            planned_secs: 90,
        }
    }

    #[test]
    fn status_line_per_phase() {
        assert_eq!(view(Phase::Idle, vec![], None).status_line(), "Waiting for intervals");
        assert_eq!(view(Phase::Idle, vec![row("#1", false)], None).status_line(), "Ready");
        assert_eq!(
            view(Phase::Running, vec![row("#1", true)], Some(0)).status_line(),
            "Interval #1 running"
        );
        assert!(view(Phase::Finished, vec![row("#1", false)], None)
            .status_line()
            .contains("replay"));
    }

    #[test]
    fn clock_text_formats_remaining() {
        assert_eq!(view(Phase::Running, vec![], None).clock_text(), "01:15");
    }
}
