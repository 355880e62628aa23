//! Boundary cues.

use std::io::{self, Write};

use crate::error::CueError;

const BEL: &[u8] = b"\x07";

/// Best-effort notification fired when an interval runs out.
///
/// The sequencer treats failures as non-fatal: they are logged and the
/// boundary transition proceeds as if the cue had played.
pub trait CueEmitter {
    fn emit(&mut self) -> Result<(), CueError>;
}

/// Rings the terminal bell by writing ASCII BEL to a sink.
#[derive(Debug)]
pub struct TerminalBell<W: Write> {
    out: W,
    bells: u32,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout(bells: u32) -> Self {
        Self::new(io::stdout(), bells)
    }
}

impl TerminalBell<io::Stderr> {
    /// Ring on stderr, for sessions whose stdout is machine-read.
    pub fn stderr(bells: u32) -> Self {
        Self::new(io::stderr(), bells)
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W, bells: u32) -> Self {
        Self {
            out,
            bells: bells.max(1),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CueEmitter for TerminalBell<W> {
    fn emit(&mut self) -> Result<(), CueError> {
        for _ in 0..self.bells {
            self.out.write_all(BEL)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Cue that does nothing. Used when cues are disabled in config.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCue;

impl CueEmitter for SilentCue {
    fn emit(&mut self) -> Result<(), CueError> {
        Ok(())
    }
}

impl<T: CueEmitter + ?Sized> CueEmitter for Box<T> {
    fn emit(&mut self) -> Result<(), CueError> {
        (**self).emit()
    }
}
