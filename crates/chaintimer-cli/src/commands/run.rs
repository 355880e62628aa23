use std::io::{self, BufRead};
use std::time::Duration;

use chaintimer_core::error::Result;
use chaintimer_core::timer::parse_duration;
use chaintimer_core::{
    Config, CueEmitter, Event, Phase, Presenter, Sequencer, SilentCue, TerminalBell, TokioClock,
};
use clap::Args;
use tokio::sync::mpsc;

use crate::presenter::{render_list, JsonPresenter, TextPresenter};

#[derive(Args)]
pub struct RunArgs {
    /// Durations to queue up front (MMSS digits or M:SS)
    durations: Vec<String>,
    /// Start counting down immediately
    #[arg(long)]
    start: bool,
    /// Exit as soon as the last interval completes
    #[arg(long)]
    exit_when_finished: bool,
    /// Print JSON lines instead of the text view
    #[arg(long)]
    json: bool,
    /// Override the tick period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Do not ring the terminal bell at boundaries
    #[arg(long)]
    no_cue: bool,
}

/// A line typed into a running session.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Add(String),
    Start,
    Repeat,
    Skip,
    Reset,
    List,
    Help,
    Quit,
}

impl Input {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            return Ok(None);
        };
        let input = match cmd.to_ascii_lowercase().as_str() {
            "add" | "a" => {
                let raw = words.next().ok_or("usage: add <MMSS | M:SS>")?;
                Input::Add(raw.to_string())
            }
            "start" | "s" => Input::Start,
            "repeat" | "r" => Input::Repeat,
            "skip" | "n" => Input::Skip,
            "reset" | "x" => Input::Reset,
            "list" | "l" => Input::List,
            "help" | "h" | "?" => Input::Help,
            "quit" | "q" | "exit" => Input::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(Some(input))
    }
}

const HELP: &str = "\
commands:
  add <dur>   queue an interval (MMSS digits or M:SS)
  start       start or replay the sequence
  repeat      queue one more run of the active interval right after it
  skip        move to the next interval, keeping the remaining time
  reset       clear everything
  list        show the queue
  quit        leave";

type Session = Sequencer<TokioClock, Box<dyn CueEmitter>, Box<dyn Presenter>>;

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using default config");
        Config::default()
    });
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args, config))?;
    Ok(())
}

async fn session(args: RunArgs, config: Config) -> Result<()> {
    let json = args.json || config.ui.json;
    let max_digits = config.timer.max_digits;
    let period = args
        .tick_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.tick_period());

    let cue: Box<dyn CueEmitter> = if !config.cue.enabled || args.no_cue {
        Box::new(SilentCue)
    } else if json {
        Box::new(TerminalBell::stderr(config.cue.bells))
    } else {
        Box::new(TerminalBell::stdout(config.cue.bells))
    };
    let presenter: Box<dyn Presenter> = if json {
        Box::new(JsonPresenter::stdout())
    } else {
        Box::new(TextPresenter::stdout(config.ui.show_remaining_in_list))
    };

    let (clock, mut ticks) = TokioClock::new();
    let mut seq: Session = Sequencer::new(clock, cue, presenter).with_tick_period(period);

    for raw in &args.durations {
        let secs = parse_duration(raw, max_digits)?;
        seq.enqueue(i64::from(secs));
    }
    if args.start {
        seq.start();
    }
    flush_events(&mut seq, json)?;

    let mut input = spawn_stdin_reader();
    let mut stdin_open = true;

    loop {
        let finished = seq.phase() == Phase::Finished;
        if args.exit_when_finished && finished {
            break;
        }
        if !stdin_open && seq.phase() != Phase::Running {
            break;
        }

        tokio::select! {
            Some(id) = ticks.recv() => {
                seq.on_tick(id);
            }
            line = input.recv(), if stdin_open => match line {
                Some(Ok(line)) => {
                    if !apply_line(&mut seq, &line, max_digits, json)? {
                        break;
                    }
                }
                Some(Err(e)) => eprintln!("skipping unreadable input: {e}"),
                None => stdin_open = false,
            },
            else => break,
        }
        flush_events(&mut seq, json)?;
    }

    flush_events(&mut seq, json)?;
    Ok(())
}

/// Read stdin on a plain thread; tokio's stdin would keep the runtime alive
/// on exit while a read is pending.
///
/// A line that is not valid UTF-8 is passed on as an error and reading
/// continues; any other read error ends input.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let fatal = matches!(&line, Err(e) if e.kind() != io::ErrorKind::InvalidData);
            if tx.send(line).is_err() || fatal {
                break;
            }
        }
    });
    rx
}

/// Handle one input line. Returns `false` when the session should end.
fn apply_line(
    seq: &mut Session,
    line: &str,
    max_digits: usize,
    json: bool,
) -> Result<bool> {
    let input = match Input::parse(line) {
        Ok(Some(input)) => input,
        Ok(None) => return Ok(true),
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(true);
        }
    };

    match input {
        Input::Add(raw) => match parse_duration(&raw, max_digits) {
            Ok(secs) => {
                seq.enqueue(i64::from(secs));
            }
            Err(e) => eprintln!("{e}"),
        },
        Input::Start => {
            if seq.start().is_none() {
                eprintln!("nothing to start");
            }
        }
        Input::Repeat => {
            if seq.duplicate_active().is_none() {
                eprintln!("repeat unavailable");
            }
        }
        Input::Skip => {
            if seq.skip_active().is_none() {
                eprintln!("nothing to skip");
            }
        }
        Input::Reset => {
            seq.reset();
        }
        Input::List => {
            if json {
                println!("{}", serde_json::to_string(&seq.snapshot())?);
            } else {
                let view = seq.view();
                print!("{}", render_list(&view, true));
                println!("{}  {}", view.clock_text(), view.status_line());
            }
        }
        Input::Help => println!("{HELP}"),
        Input::Quit => return Ok(false),
    }
    Ok(true)
}

/// Print (JSON) or log (text) the events recorded since the last call.
fn flush_events(seq: &mut Session, json: bool) -> Result<()> {
    for event in seq.drain_events() {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            log_event(&event);
        }
    }
    Ok(())
}

fn log_event(event: &Event) {
    match event {
        Event::IntervalCompleted { label, cue_ok, .. } => {
            tracing::info!(%label, cue_ok, "interval completed");
        }
        Event::IntervalSkipped {
            label, parked_secs, ..
        } => {
            tracing::info!(%label, parked_secs, "interval skipped");
        }
        other => tracing::debug!(kind = other.kind(), "event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(Input::parse("add 130"), Ok(Some(Input::Add("130".into()))));
        assert_eq!(Input::parse("  S "), Ok(Some(Input::Start)));
        assert_eq!(Input::parse("r"), Ok(Some(Input::Repeat)));
        assert_eq!(Input::parse("skip"), Ok(Some(Input::Skip)));
        assert_eq!(Input::parse("x"), Ok(Some(Input::Reset)));
        assert_eq!(Input::parse("q"), Ok(Some(Input::Quit)));
        assert_eq!(Input::parse(""), Ok(None));
    }

    #[test]
    fn rejects_unknown_and_incomplete_commands() {
        assert!(Input::parse("add").is_err());
        assert!(Input::parse("pause").unwrap_err().contains("pause"));
    }
}
