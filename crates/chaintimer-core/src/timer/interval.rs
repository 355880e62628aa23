use serde::{Deserialize, Serialize};

const REPEAT_SUFFIX: &str = "(repeat)";

/// One queued countdown unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Duration in seconds, fixed at creation.
    planned_secs: u32,
    /// Progress preserved while the interval is not active.
    remaining_at_rest: u32,
    /// Explicit label. `None` means the interval is auto-numbered.
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    repeated_already: bool,
}

impl Interval {
    /// Create a fresh, unlabeled interval. Returns `None` for zero seconds.
    pub fn new(planned_secs: u32) -> Option<Self> {
        if planned_secs == 0 {
            return None;
        }
        Some(Self {
            planned_secs,
            remaining_at_rest: planned_secs,
            label: None,
            repeated_already: false,
        })
    }

    fn labeled(planned_secs: u32, label: String) -> Self {
        Self {
            planned_secs,
            remaining_at_rest: planned_secs,
            label: Some(label),
            repeated_already: false,
        }
    }

    pub fn planned_secs(&self) -> u32 {
        self.planned_secs
    }

    pub fn remaining_at_rest(&self) -> u32 {
        self.remaining_at_rest
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn repeated_already(&self) -> bool {
        self.repeated_already
    }

    pub(crate) fn park(&mut self, remaining_secs: u32) {
        self.remaining_at_rest = remaining_secs;
    }

    pub(crate) fn restore(&mut self) {
        self.remaining_at_rest = self.planned_secs;
    }
}

/// Ordered interval queue. Position in the vector is execution order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntervalQueue {
    intervals: Vec<Interval>,
}

impl IntervalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Interval> {
        self.intervals.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }

    pub(crate) fn push(&mut self, interval: Interval) {
        self.intervals.push(interval);
    }

    pub(crate) fn clear(&mut self) {
        self.intervals.clear();
    }

    pub(crate) fn restore_all(&mut self) {
        self.intervals.iter_mut().for_each(Interval::restore);
    }

    /// Display label for the interval at `index`.
    ///
    /// Unlabeled intervals are numbered `#n` by their position among the
    /// unlabeled intervals only, so inserted repeats do not shift numbering.
    pub fn display_label(&self, index: usize) -> Option<String> {
        let interval = self.intervals.get(index)?;
        if let Some(label) = interval.label() {
            return Some(label.to_string());
        }
        let number = self
            .intervals
            .iter()
            .take(index + 1)
            .filter(|i| i.label.is_none())
            .count();
        Some(format!("#{number}"))
    }

    /// Display labels for every interval, in queue order.
    pub fn labels(&self) -> Vec<String> {
        let mut unlabeled = 0;
        self.intervals
            .iter()
            .map(|interval| match interval.label() {
                Some(label) => label.to_string(),
                None => {
                    unlabeled += 1;
                    format!("#{unlabeled}")
                }
            })
            .collect()
    }

    /// Insert a fresh copy of the interval at `index` directly behind it.
    ///
    /// The copy gets the original planned duration, not the in-flight
    /// remaining time. Returns the new interval's position, or `None` when
    /// `index` is out of range or the interval was already repeated.
    pub(crate) fn duplicate_after(&mut self, index: usize) -> Option<usize> {
        let label = self.display_label(index)?;
        let source = self.intervals.get_mut(index)?;
        if source.repeated_already {
            return None;
        }
        source.repeated_already = true;
        let copy = Interval::labeled(source.planned_secs, format!("{label}{REPEAT_SUFFIX}"));
        self.intervals.insert(index + 1, copy);
        Some(index + 1)
    }
}
