//! Touchpad coordinate range detector
//!
//! Records the smallest and largest coordinates a touchpad reports until
//! Ctrl+C, then suggests a udev rule overriding the kernel's axis ranges.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use tracing::info;

use evdev_measure::cli;
use evdev_measure::event_loop;
use evdev_measure::signal::InterruptFd;
use evdev_measure::touchpad::{
    format_kernel_ranges, format_report, read_dmi_modalias, EdgeDetector, DMI_MODALIAS_PATH,
};
use evdev_measure::{Bus, DeviceSession, ToolError};

const ABOUT: &str = "This tool reads the touchpad events from the kernel and calculates\n\
the minimum and maximum for the x and y coordinates, respectively.";

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();
    let argv0 = args
        .first()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_else(|| "touchpad-edge-detector".to_string());

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
    if !caps.has_abs_xy() {
        return Err(ToolError::MissingAbsAxes.into());
    }
    session.check_grab()?;
    info!(
        "Measuring {} ({}:{:04x}:{:04x}, mt: {})",
        caps.name,
        caps.bus,
        caps.vendor,
        caps.product,
        caps.has_mt_position()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Touchpad {} on {}", caps.name, session.path())?;
    writeln!(out, "Move one finger around the touchpad to detect the actual edges")?;
    writeln!(out, "{}", format_kernel_ranges(&caps))?;
    out.flush()?;

    let interrupt = InterruptFd::new()?;
    let mut detector = EdgeDetector::new();
    let code = match event_loop::run(&mut session, &interrupt, &mut detector, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n{e}");
            ExitCode::FAILURE
        }
    };

    let dmi = match caps.bus {
        Bus::Usb | Bus::Bluetooth => String::new(),
        _ => read_dmi_modalias(DMI_MODALIAS_PATH),
    };

    writeln!(out)?;
    write!(out, "{}", format_report(&caps, detector.dimensions(), &dmi))?;
    out.flush()?;

    Ok(code)
}
