//! Error types shared by both tools

use std::io;
use thiserror::Error;

/// Errors from device access and the event loop
///
/// The display text is what the tools print on stderr before exiting.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The device node could not be opened (missing path, permissions)
    #[error("Error opening the device: {0}")]
    Open(#[source] io::Error),

    /// The node opened but is not a usable evdev device
    #[error("Error fetching the device info: {0}")]
    DeviceInfo(#[source] io::Error),

    /// Another process holds an exclusive grab on the device
    #[error(
        "Error: cannot grab the device, something else is grabbing it.\n\
         Use 'fuser -v {path}' to find processes with an open fd"
    )]
    Grab {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Touchpad lacks ABS_X/ABS_Y
    #[error("Error: this device does not have abs axes")]
    MissingAbsAxes,

    /// Kernel dropped events (SYN_DROPPED)
    #[error("Error: cannot keep up")]
    CannotKeepUp,

    /// Unrecoverable read error on the device
    #[error("Error: {0}")]
    Read(#[source] io::Error),

    /// Axis name that is neither a known ABS_* code nor a number
    #[error("Error: unknown axis '{0}'")]
    UnknownAxis(String),

    /// LED name that is neither a known LED_* code nor a number
    #[error("Error: unknown LED '{0}'")]
    UnknownLed(String),

    #[error("Device '{device}' doesn't have axis {axis}")]
    MissingAxis { device: String, axis: String },

    #[error("Device '{device}' doesn't have {led}")]
    MissingLed { device: String, led: String },

    /// EVIOCSABS was rejected
    #[error("Failed to set absinfo {axis}: {source}")]
    SetAbs {
        axis: String,
        #[source]
        source: io::Error,
    },

    /// Writing the LED event failed
    #[error("Failed to set LED {led}: {source}")]
    SetLed {
        led: String,
        #[source]
        source: io::Error,
    },

    /// Signal descriptor setup or wait failed
    #[error("Error setting up signal handling: {0}")]
    Signal(#[source] io::Error),

    /// Writing to the terminal failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
