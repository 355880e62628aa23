//! Terminal presenters.

use std::io::{self, Write};

use chaintimer_core::timer::format_clock;
use chaintimer_core::{Phase, Presenter, SequencerView};
use serde_json::json;

/// Render the queue, one interval per line, active row marked with `>`.
pub fn render_list(view: &SequencerView, show_remaining: bool) -> String {
    if view.rows.is_empty() {
        return "  (no intervals)\n".to_string();
    }
    let mut out = String::new();
    for row in &view.rows {
        let marker = if row.is_active { '>' } else { ' ' };
        let secs = if show_remaining {
            row.displayed_secs
        } else {
            row.planned_secs
        };
        out.push_str(&format!(
            "{marker} {:<16} {}\n",
            row.label,
            format_clock(i64::from(secs))
        ));
    }
    out
}

/// Plain-text presenter.
///
/// Prints the list whenever the queue shape, the active row or the phase
/// changes, and a countdown line on every refresh.
pub struct TextPresenter<W: Write> {
    out: W,
    show_remaining: bool,
    last_layout: Option<(Phase, Vec<String>, Option<usize>)>,
}

impl TextPresenter<io::Stdout> {
    pub fn stdout(show_remaining: bool) -> Self {
        Self::new(io::stdout(), show_remaining)
    }
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W, show_remaining: bool) -> Self {
        Self {
            out,
            show_remaining,
            last_layout: None,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_view(&mut self, view: &SequencerView) -> io::Result<()> {
        let layout = (
            view.phase,
            view.rows.iter().map(|r| r.label.clone()).collect::<Vec<_>>(),
            view.active_index,
        );
        if self.last_layout.as_ref() != Some(&layout) {
            self.out
                .write_all(render_list(view, self.show_remaining).as_bytes())?;
            self.last_layout = Some(layout);
        }
        writeln!(self.out, "{}  {}", view.clock_text(), view.status_line())?;
        self.out.flush()
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn refresh(&mut self, view: &SequencerView) {
        if let Err(e) = self.write_view(view) {
            tracing::debug!(error = %e, "text presenter write failed");
        }
    }
}

/// JSON-lines presenter: one `{"type":"View",...}` object per refresh.
pub struct JsonPresenter<W: Write> {
    out: W,
}

impl JsonPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> JsonPresenter<W> {
    #[cfg(test)]
    fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn refresh(&mut self, view: &SequencerView) {
        let line = json!({ "type": "View", "view": view });
        if let Err(e) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            tracing::debug!(error = %e, "json presenter write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaintimer_core::{ManualClock, Sequencer, SilentCue};

    #[test]
    fn text_presenter_prints_list_on_layout_change_only() {
        let mut seq = Sequencer::new(ManualClock::new(), SilentCue, TextPresenter::new(Vec::new(), true));
        seq.enqueue(90);
        seq.enqueue(5);
        seq.start();
        seq.tick();

        let out = String::from_utf8(into_text(seq)).unwrap();
        assert!(out.contains(&format!("> {:<16} 01:30", "#1")));
        assert!(out.contains("01:29  Interval #1 running"));
        // List printed for: first enqueue, second enqueue, start. Not for the tick.
        assert_eq!(out.matches("#2 ").count(), 2);
    }

    fn into_text(seq: Sequencer<ManualClock, SilentCue, TextPresenter<Vec<u8>>>) -> Vec<u8> {
        seq.into_presenter().into_inner()
    }

    #[test]
    fn render_list_shows_planned_when_configured() {
        let mut seq = Sequencer::new(ManualClock::new(), SilentCue, JsonPresenter::new(Vec::new()));
        seq.enqueue(60);
        seq.start();
        seq.tick();
        let view = seq.view();
        assert!(render_list(&view, true).contains("00:59"));
        assert!(render_list(&view, false).contains("01:00"));
    }

    #[test]
    fn json_presenter_emits_one_line_per_refresh() {
        let mut seq = Sequencer::new(ManualClock::new(), SilentCue, JsonPresenter::new(Vec::new()));
        seq.enqueue(3);
        seq.start();
        let out = String::from_utf8(seq.into_presenter().out).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let last: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(last["type"], "View");
        assert_eq!(last["view"]["phase"], "running");
        assert_eq!(last["view"]["remaining_secs"], 3);
    }

    #[test]
    fn empty_queue_renders_placeholder() {
        let seq = Sequencer::new(ManualClock::new(), SilentCue, JsonPresenter::new(Vec::new()));
        assert_eq!(render_list(&seq.view(), true), "  (no intervals)\n");
    }
}
