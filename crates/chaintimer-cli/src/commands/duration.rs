use clap::Args;
use chaintimer_core::timer::{format_clock, parse_duration};
use chaintimer_core::Config;
use serde::Serialize;

#[derive(Args)]
pub struct DurationArgs {
    /// Keypad digits (MMSS, right-aligned) or M:SS
    raw: String,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Parsed<'a> {
    raw: &'a str,
    seconds: u32,
    display: String,
}

pub fn run(args: DurationArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let seconds = parse_duration(&args.raw, config.timer.max_digits)?;
    let parsed = Parsed {
        raw: &args.raw,
        seconds,
        display: format_clock(i64::from(seconds)),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    } else {
        println!("{} seconds ({})", parsed.seconds, parsed.display);
    }
    Ok(())
}
