//! Final mouse report: resolution table and hwdb entry

use std::fmt::Write as _;

use crate::device::DeviceCapabilities;

use super::frequency::MeasurementState;

/// Candidate resolutions shown in the table (DPI)
pub const RESOLUTIONS: std::ops::RangeInclusive<u32> = 400..=2500;
pub const RESOLUTION_STEP: usize = 200;

const MM_PER_INCH: f64 = 25.4;

/// One row of the resolution table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelRow {
    pub dpi: u32,
    pub inches: f64,
    pub millimeters: i64,
}

/// Physical travel implied by `distance` device units at each candidate resolution
pub fn travel_table(distance: u32) -> Vec<TravelRow> {
    RESOLUTIONS
        .step_by(RESOLUTION_STEP)
        .map(|dpi| {
            let inches = f64::from(distance) / f64::from(dpi);
            TravelRow {
                dpi,
                inches,
                millimeters: (inches * MM_PER_INCH).round() as i64,
            }
        })
        .collect()
}

/// Summary printed after the measurement loop ends
pub fn format_summary(state: &MeasurementState) -> String {
    let distance = state.distance();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Estimated sampling frequency: {}Hz",
        state.peak_frequency.round() as i64
    );
    out.push_str(
        "To calculate resolution, measure physical distance covered\n\
         and look up the matching resolution in the table below\n",
    );

    // Above 2500dpi manufacturers usually advertise the value anyway
    for row in travel_table(distance) {
        let _ = writeln!(
            out,
            "{:8}mm\t{:8.2}in\t{:8}dpi",
            row.millimeters, row.inches, row.dpi
        );
    }

    let _ = write!(
        out,
        "If your resolution is not in the list, calculate it with:\n\
         \tresolution={distance}/inches, or\n\
         \tresolution={distance} * 25.4/mm\n"
    );
    out
}

/// hwdb match entry for the measured device
pub fn format_hwdb_entry(caps: &DeviceCapabilities, state: &MeasurementState) -> String {
    format!(
        "Entry for hwdb match (replace XXX with the resolution in DPI):\n\
         mouse:{}:v{:04x}p{:04x}:name:{}:\n \
         MOUSE_DPI=XXX@{}\n",
        caps.bus.name(),
        caps.vendor,
        caps.product,
        caps.name,
        state.peak_frequency.round() as i64
    )
}
