//! Input device measurement tools
//!
//! Shared library behind `mouse-dpi-tool`, `touchpad-edge-detector` and
//! `evdev-tweak-device`. The two measurement tools open an evdev node, fold
//! the incoming events into a small statistics record and print a report
//! when interrupted; the tweak tool writes axis ranges and LED state back.

pub mod cli;
pub mod device;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod mouse;
pub mod ring;
pub mod signal;
pub mod spinner;
pub mod touchpad;
pub mod tweak;

pub use device::{AbsSettings, AxisInfo, Bus, DeviceCapabilities, DeviceSession, EventSource, ReadStatus};
pub use error::ToolError;
pub use event::{Event, EventKind};
pub use event_loop::Accumulator;
pub use mouse::FrequencyEstimator;
pub use touchpad::EdgeDetector;
