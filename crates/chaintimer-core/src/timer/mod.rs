mod clock;
mod cue;
mod engine;
mod interval;
mod keypad;
mod view;

pub use clock::{Clock, ManualClock, SubscriptionId, TokioClock};
pub use cue::{CueEmitter, SilentCue, TerminalBell};
pub use engine::{Phase, Sequencer, EVENT_BACKLOG, TICK_PERIOD};
pub use interval::{Interval, IntervalQueue};
pub use keypad::{format_clock, parse_duration, Keypad, DEFAULT_MAX_DIGITS, MAX_KEYPAD_DIGITS};
pub use view::{IntervalRow, NoopPresenter, Permissions, Presenter, SequencerView};
