//! Integration tests for the interval sequencer driven by a manual clock.

use chaintimer_core::{
    CueError, CueEmitter, Event, ManualClock, NoopPresenter, Phase, Sequencer, SilentCue,
};
use proptest::prelude::*;

#[derive(Debug, Default)]
struct FlakyCue {
    calls: usize,
}

impl CueEmitter for FlakyCue {
    fn emit(&mut self) -> Result<(), CueError> {
        self.calls += 1;
        if self.calls % 2 == 0 {
            return Err(CueError::Unavailable("device busy".into()));
        }
        Ok(())
    }
}

fn fresh() -> Sequencer<ManualClock, SilentCue, NoopPresenter> {
    Sequencer::new(ManualClock::new(), SilentCue, NoopPresenter)
}

/// Fire the live subscription once, the way a real clock would.
fn fire<E: CueEmitter>(seq: &mut Sequencer<ManualClock, E, NoopPresenter>) -> Option<Event> {
    let id = *seq.clock().live().first()?;
    seq.on_tick(id)
}

#[test]
fn test_full_run_with_repeat_and_skip() {
    let mut seq = Sequencer::new(ManualClock::new(), FlakyCue::default(), NoopPresenter);
    seq.enqueue(3);
    seq.enqueue(2);
    seq.enqueue(4);
    seq.start();

    // Repeat #1 while it counts down, then let it run out.
    fire(&mut seq);
    assert!(seq.duplicate_active().is_some());
    while seq.active_index() == Some(0) {
        fire(&mut seq);
    }

    // The repeat runs next, from its full planned duration.
    assert_eq!(seq.active_index(), Some(1));
    assert_eq!(seq.remaining_secs(), 3);
    let labels: Vec<_> = seq.view().rows.into_iter().map(|r| r.label).collect();
    assert_eq!(labels, vec!["#1", "#1(repeat)", "#2", "#3"]);

    // Second boundary cue fails; the sequence still advances.
    for _ in 0..4 {
        fire(&mut seq);
    }
    assert_eq!(seq.cue().calls, 2);
    assert_eq!(seq.active_index(), Some(2));

    // Skip #2 with one second left.
    fire(&mut seq);
    seq.skip_active();
    assert_eq!(seq.queue().get(2).unwrap().remaining_at_rest(), 1);
    assert_eq!(seq.remaining_secs(), 4);

    for _ in 0..5 {
        fire(&mut seq);
    }
    assert_eq!(seq.phase(), Phase::Finished);
    assert_eq!(seq.clock().live_count(), 0);
    assert_eq!(seq.cue().calls, 3);

    let view = seq.view();
    assert_eq!(view.rows[2].displayed_secs, 1);
    assert!(view.rows.iter().all(|r| !r.is_active));
    assert!(view.permissions.start);
    assert!(!view.permissions.skip);
}

#[test]
fn test_at_most_one_live_subscription() {
    let mut seq = fresh();
    for secs in [1, 1, 2] {
        seq.enqueue(secs);
    }
    seq.start();
    seq.start();
    let mut observed = Vec::new();
    while seq.phase() == Phase::Running {
        observed.push(seq.clock().live_count());
        fire(&mut seq);
    }
    assert!(observed.iter().all(|&n| n == 1));
    assert_eq!(seq.clock().live_count(), 0);
    assert_eq!(seq.clock().schedule_count(), seq.clock().cancel_count());
}

#[test]
fn test_events_are_serializable() {
    let mut seq = fresh();
    seq.enqueue(1);
    seq.start();
    fire(&mut seq);
    fire(&mut seq);

    for event in seq.drain_events() {
        let json = serde_json::to_value(&event).unwrap();
        assert!(json["type"].is_string());
        assert!(json["at"].is_string());
    }
    let snapshot = serde_json::to_value(seq.snapshot()).unwrap();
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert_eq!(snapshot["phase"], "finished");
}

#[test]
fn test_finish_then_enqueue_and_replay() {
    let mut seq = fresh();
    seq.enqueue(1);
    seq.start();
    fire(&mut seq);
    fire(&mut seq);
    assert_eq!(seq.phase(), Phase::Finished);

    seq.enqueue(2);
    assert_eq!(seq.phase(), Phase::Finished);
    seq.start();
    assert_eq!(seq.active_index(), Some(0));
    assert_eq!(seq.remaining_secs(), 1);
    fire(&mut seq);
    fire(&mut seq);
    assert_eq!(seq.active_index(), Some(1));
    assert_eq!(seq.remaining_secs(), 2);
}

proptest! {
    #[test]
    fn enqueue_grows_queue_only_for_positive(durations in prop::collection::vec(-100i64..100, 0..40)) {
        let mut seq = fresh();
        for d in durations {
            let before = seq.queue().len();
            let event = seq.enqueue(d);
            if d > 0 {
                prop_assert_eq!(seq.queue().len(), before + 1);
                prop_assert!(event.is_some());
            } else {
                prop_assert_eq!(seq.queue().len(), before);
                prop_assert!(event.is_none());
            }
        }
    }

    #[test]
    fn reset_always_returns_to_idle(
        durations in prop::collection::vec(1i64..5, 1..6),
        ticks in 0usize..30,
        start in any::<bool>(),
    ) {
        let mut seq = fresh();
        for d in durations {
            seq.enqueue(d);
        }
        if start {
            seq.start();
        }
        for _ in 0..ticks {
            fire(&mut seq);
        }
        seq.reset();
        prop_assert_eq!(seq.queue().len(), 0);
        prop_assert_eq!(seq.phase(), Phase::Idle);
        prop_assert_eq!(seq.cursor(), 0);
        prop_assert_eq!(seq.remaining_secs(), 0);
        prop_assert_eq!(seq.subscription(), None);
        prop_assert_eq!(seq.clock().live_count(), 0);
    }

    #[test]
    fn running_iff_live_subscription(
        durations in prop::collection::vec(1i64..4, 1..5),
        ops in prop::collection::vec(0u8..5, 0..60),
    ) {
        let mut seq = fresh();
        for d in durations {
            seq.enqueue(d);
        }
        for op in ops {
            match op {
                0 => { seq.start(); }
                1 => { seq.skip_active(); }
                2 => { seq.duplicate_active(); }
                _ => { fire(&mut seq); }
            }
            let running = seq.phase() == Phase::Running;
            prop_assert_eq!(running, seq.clock().live_count() == 1);
            prop_assert!(seq.clock().live_count() <= 1);
            if running {
                prop_assert!(seq.cursor() < seq.queue().len());
            }
        }
    }
}
