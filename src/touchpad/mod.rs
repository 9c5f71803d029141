//! Touchpad edge detection
//!
//! Tracks the coordinate range a touchpad actually reports and suggests a
//! udev/hwdb override that corrects the ranges advertised by the kernel.

pub mod edges;
pub mod report;

pub use edges::{DimensionState, EdgeDetector};
pub use report::{
    format_kernel_ranges, format_report, kernel_size_mm, match_string, read_dmi_modalias,
    DMI_FALLBACK, DMI_MODALIAS_PATH,
};
