//! Mouse sampling frequency and resolution helper
//!
//! Reads relative motion from an evdev node until Ctrl+C, then prints the
//! distance-to-resolution table and an hwdb entry for the device.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use tracing::info;

use evdev_measure::cli;
use evdev_measure::event_loop;
use evdev_measure::mouse::{format_hwdb_entry, format_summary, FrequencyEstimator};
use evdev_measure::signal::InterruptFd;
use evdev_measure::DeviceSession;

const ABOUT: &str = "This tool reads relative events from the kernel and calculates\n\
the distance covered and maximum frequency of the incoming events.\n\
Some mouse devices provide dynamic frequencies, it is\n\
recommended to measure multiple times to obtain the highest value.";

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();
    let argv0 = args
        .first()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mouse-dpi-tool".to_string());

    let Some(path) = cli::parse_device_path(args.iter()) else {
        print!("{}", cli::usage(&argv0, ABOUT));
        return ExitCode::FAILURE;
    };

    cli::init_logging();

    match run(&path) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path) -> Result<ExitCode> {
    let mut session = DeviceSession::open(path)?;
    let caps = session.capabilities()?;
    session.check_grab()?;
    info!("Measuring {} ({}:{:04x}:{:04x})", caps.name, caps.bus, caps.vendor, caps.product);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Mouse {} on {}", caps.name, session.path())?;
    writeln!(out, "Move the device 250mm/10in or more along the x-axis.")?;
    writeln!(out, "Pause 3 seconds before movement to reset, Ctrl+C to exit.")?;
    out.flush()?;

    let interrupt = InterruptFd::new()?;
    let mut estimator = FrequencyEstimator::new();
    let code = match event_loop::run(&mut session, &interrupt, &mut estimator, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n{e}");
            ExitCode::FAILURE
        }
    };

    let state = estimator.into_state();
    writeln!(out)?;
    write!(out, "{}", format_summary(&state))?;
    writeln!(out)?;
    write!(out, "{}", format_hwdb_entry(&caps, &state))?;
    out.flush()?;

    Ok(code)
}
