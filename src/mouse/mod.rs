//! Mouse DPI measurement
//!
//! Relative X motion is summed into a travel distance while sync timestamps
//! feed a sampling-frequency estimate. The report maps the distance onto a
//! table of candidate resolutions.

pub mod frequency;
pub mod report;

pub use frequency::{estimate_frequency, FrequencyEstimator, MeasurementState, EVENT_WINDOW, IDLE_RESET_US};
pub use report::{format_hwdb_entry, format_summary, travel_table, TravelRow};
