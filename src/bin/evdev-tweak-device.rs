//! Kernel absinfo and LED adjustment
//!
//! Overrides the range, resolution, fuzz or flat of one absolute axis, or
//! switches an LED, on an evdev node. Nothing is printed on success.

use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::Result;

use evdev_measure::cli::{self, TweakArgs};
use evdev_measure::tweak::Tweak;
use evdev_measure::DeviceSession;

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();
    let argv0 = args
        .first()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_else(|| "evdev-tweak-device".to_string());

    let Some(args) = cli::parse_tweak_args(args.iter()) else {
        print!("{}", cli::tweak_usage(&argv0));
        return ExitCode::FAILURE;
    };

    cli::init_logging();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &TweakArgs) -> Result<()> {
    let tweak = Tweak::from_args(args)?;
    let mut session = DeviceSession::open(&args.device)?;
    tweak.apply(&mut session)?;
    Ok(())
}
