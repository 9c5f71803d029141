//! Command line definitions shared by the tools

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};

/// `<tool> <device-path>`
#[derive(Parser, Debug)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct DeviceArgs {
    /// Event device node, e.g. /dev/input/event0
    #[arg(value_name = "DEVICE")]
    pub device: PathBuf,

    /// Anything after the device is accepted and ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub ignored: Vec<OsString>,
}

/// Parse the command line into a device path
///
/// Returns `None` whenever usage should be printed instead: a missing device,
/// a flag in its place, or a path that starts with `-`. Arguments after the
/// device are ignored.
pub fn parse_device_path<I, T>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = DeviceArgs::try_parse_from(args).ok()?;
    if args.device.as_os_str().is_empty() || args.device.to_string_lossy().starts_with('-') {
        return None;
    }
    Some(args.device)
}

/// `evdev-tweak-device --abs <axis> [...] | --led <led> --on|--off <device-path>`
///
/// Exactly one of `--abs` and `--led` is required. The absinfo overrides
/// only make sense with `--abs`, `--on`/`--off` only with `--led`.
#[derive(Parser, Debug)]
#[command(disable_help_flag = true, disable_version_flag = true)]
#[command(group(ArgGroup::new("action").required(true).args(["abs", "led"])))]
#[command(group(ArgGroup::new("state").args(["on", "off"])))]
pub struct TweakArgs {
    /// Axis to change, e.g. ABS_X or ABS_MT_POSITION_Y
    #[arg(long, value_name = "AXIS")]
    pub abs: Option<String>,

    #[arg(long, requires = "abs", allow_negative_numbers = true)]
    pub min: Option<i32>,

    #[arg(long, requires = "abs", allow_negative_numbers = true)]
    pub max: Option<i32>,

    #[arg(long, requires = "abs", allow_negative_numbers = true)]
    pub res: Option<i32>,

    #[arg(long, requires = "abs", allow_negative_numbers = true)]
    pub fuzz: Option<i32>,

    #[arg(long, requires = "abs", allow_negative_numbers = true)]
    pub flat: Option<i32>,

    /// LED to switch, e.g. LED_CAPSL
    #[arg(long, value_name = "LED", requires = "state")]
    pub led: Option<String>,

    #[arg(long, requires = "led")]
    pub on: bool,

    #[arg(long, requires = "led")]
    pub off: bool,

    #[arg(value_name = "DEVICE")]
    pub device: PathBuf,
}

/// Parse the tweak tool's command line, `None` means print usage
pub fn parse_tweak_args<I, T>(args: I) -> Option<TweakArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = TweakArgs::try_parse_from(args).ok()?;
    if args.device.as_os_str().is_empty() || args.device.to_string_lossy().starts_with('-') {
        return None;
    }
    Some(args)
}

fn program_name(argv0: &str) -> String {
    Path::new(argv0)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| argv0.to_string())
}

/// Usage text for a tool; `about` describes what it measures
pub fn usage(argv0: &str, about: &str) -> String {
    let program = program_name(argv0);
    format!("Usage: {program} /dev/input/event0\n\n{about}\n")
}

/// Usage text for the tweak tool
pub fn tweak_usage(argv0: &str) -> String {
    let program = program_name(argv0);
    format!(
        "Usage: {program} --abs <axis> [--min min] [--max max] [--res res] [--fuzz fuzz] [--flat flat] /dev/input/eventXYZ\n\
         \tChange the absinfo struct for the named axis\n\
         {program} --led <led> --on|--off /dev/input/eventXYZ\n\
         \tEnable or disable the named LED\n"
    )
}

/// Initialize logging on stderr, `RUST_LOG` overrides the `warn` default
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
