//! Touchpad report: kernel ranges, physical size and the suggested udev rule

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::device::{Bus, DeviceCapabilities};

use super::edges::DimensionState;

/// Host DMI identification string
pub const DMI_MODALIAS_PATH: &str = "/sys/class/dmi/id/modalias";

/// Placeholder used in the rule when the DMI modalias cannot be read
pub const DMI_FALLBACK: &str = "ERROR READING DMI MODALIAS";

/// Ranges as advertised by the kernel, printed before measuring
pub fn format_kernel_ranges(caps: &DeviceCapabilities) -> String {
    let x = caps.x.unwrap_or_default();
    let y = caps.y.unwrap_or_default();
    format!(
        "Kernel says:\tx [{}..{}], y [{}..{}]",
        x.minimum, x.maximum, y.minimum, y.maximum
    )
}

/// Size derived from the kernel ranges, `None` if any resolution is 0
pub fn kernel_size_mm(caps: &DeviceCapabilities) -> Option<(i32, i32)> {
    let w = caps.x?.size_mm()?;
    let h = caps.y?.size_mm()?;
    Some((w, h))
}

/// Read and trim the DMI modalias, falling back to a placeholder
pub fn read_dmi_modalias(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(s) => s.trim().to_string(),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            DMI_FALLBACK.to_string()
        }
    }
}

/// Match string for the hwdb/udev rule
///
/// USB and Bluetooth devices are matched by their ids; everything else
/// (typically i2c or serio touchpads) by name and the host's DMI string.
pub fn match_string(caps: &DeviceCapabilities, dmi: &str) -> String {
    match caps.bus {
        Bus::Usb | Bus::Bluetooth => format!(
            "input:b{:04X}v{:04X}p{:04X}",
            caps.bus.raw(),
            caps.vendor,
            caps.product
        ),
        _ => format!("name:{}:{}", caps.name, dmi),
    }
}

/// Report printed after measuring; `dmi` is only used for non-USB buses
pub fn format_report(caps: &DeviceCapabilities, dim: &DimensionState, dmi: &str) -> String {
    let mut out = String::new();

    match kernel_size_mm(caps) {
        Some((w, h)) => {
            let _ = writeln!(out, "Touchpad size as listed by the kernel: {w}x{h}mm");
        }
        None => out.push_str("Touchpad has no resolution, size unknown\n"),
    }

    if !dim.has_x() || !dim.has_y() {
        out.push_str(
            "No touchpad positions received on both axes.\n\
             Move one finger along all edges of the touchpad and run again.\n",
        );
        return out;
    }

    let _ = write!(
        out,
        "Calculate resolution as:\n\
         \tx axis: {}/<width in mm>\n\
         \ty axis: {}/<height in mm>\n\
         \n\
         Suggested udev rule:\n\
         # <Laptop model description goes here>\n\
         evdev:{}*\n \
         EVDEV_ABS_00={}:{}:<x resolution>\n \
         EVDEV_ABS_01={}:{}:<y resolution>\n",
        dim.width(),
        dim.height(),
        match_string(caps, dmi),
        dim.left,
        dim.right,
        dim.top,
        dim.bottom
    );

    if caps.has_mt_position() {
        let _ = write!(
            out,
            " EVDEV_ABS_35={}:{}:<x resolution>\n \
             EVDEV_ABS_36={}:{}:<y resolution>\n",
            dim.left, dim.right, dim.top, dim.bottom
        );
    }

    out
}
