//! # chaintimer Core Library
//!
//! Business logic for chaintimer, a sequential multi-interval countdown
//! timer. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Sequencer**: tick-driven state machine over an ordered interval queue.
//!   It owns no threads; a [`Clock`] hands out cancellable tick
//!   subscriptions and the caller feeds ticks back in.
//! - **Collaborators**: [`Clock`], [`CueEmitter`] and [`Presenter`] traits
//!   with tokio, terminal-bell and no-op implementations.
//! - **Keypad**: `MMSS` digit entry and `MM:SS` formatting.
//! - **Storage**: TOML-based configuration.
//!
//! ## Key Components
//!
//! - [`Sequencer`]: core state machine
//! - [`SequencerView`]: read-only projection handed to presenters
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use error::{ClockError, ConfigError, CoreError, CueError, ValidationError};
pub use events::Event;
pub use storage::Config;
pub use timer::{
    Clock, CueEmitter, Interval, IntervalQueue, IntervalRow, Keypad, ManualClock, NoopPresenter,
    Permissions, Phase, Presenter, Sequencer, SequencerView, SilentCue, SubscriptionId,
    TerminalBell, TokioClock,
};
