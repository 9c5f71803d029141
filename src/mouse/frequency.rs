//! Sampling frequency and distance estimation from relative motion
//!
//! Every synchronization event is timestamped into a 32-slot ring. Once the
//! ring has been filled, the positive gaps between adjacent slots are sorted
//! and the one at rank 16 is taken as the inter-report interval. The peak of
//! the resulting frequency over the run is what the report shows.

use tracing::debug;

use crate::event::{Event, EventKind, REL_X};
use crate::event_loop::Accumulator;
use crate::ring::TimestampRing;
use crate::spinner::Spinner;

/// Number of sync timestamps kept for the estimate
pub const EVENT_WINDOW: usize = 32;

/// Pause after which a new measurement starts (microseconds)
pub const IDLE_RESET_US: u64 = 3_000_000;

/// Rank of the sorted gap used as the representative interval
const GAP_RANK: usize = EVENT_WINDOW / 2;

/// Accumulated mouse measurement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementState {
    /// Signed sum of REL_X deltas since the last idle reset
    pub net_distance: i32,
    /// Highest frequency estimate since the last idle reset (Hz)
    pub peak_frequency: f64,
    /// Timestamp of the previous sync event, `None` before the first one
    pub last_event_timestamp_us: Option<u64>,
}

impl MeasurementState {
    /// Distance magnitude in device units
    pub fn distance(&self) -> u32 {
        self.net_distance.unsigned_abs()
    }
}

/// Estimate a frequency from a filled ring of microsecond timestamps
///
/// Returns `None` when there are not enough positive gaps to reach the
/// selection rank, which only happens with duplicated timestamps.
pub fn estimate_frequency(window: &TimestampRing<EVENT_WINDOW>) -> Option<f64> {
    let mut gaps: Vec<f64> = window
        .cyclic_pairs()
        .filter(|(earlier, later)| earlier < later)
        .map(|(earlier, later)| later - earlier)
        .take(EVENT_WINDOW - 1)
        .collect();
    gaps.sort_by(f64::total_cmp);

    gaps.get(GAP_RANK).map(|gap| 1_000_000.0 / gap)
}

/// Mouse accumulator: distance, peak frequency and the timestamp window
#[derive(Debug, Default)]
pub struct FrequencyEstimator {
    state: MeasurementState,
    window: TimestampRing<EVENT_WINDOW>,
    spinner: Spinner,
}

impl FrequencyEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MeasurementState {
        &self.state
    }

    pub fn into_state(self) -> MeasurementState {
        self.state
    }

    /// Whether the window holds enough samples to produce estimates
    pub fn window_valid(&self) -> bool {
        self.window.is_filled()
    }

    fn handle_sync(&mut self, time_us: u64) {
        let previous = self.state.last_event_timestamp_us.replace(time_us);

        let idle = previous.is_some_and(|last| last.saturating_add(IDLE_RESET_US) < time_us);
        if idle {
            debug!("Idle for more than {}us, resetting measurement", IDLE_RESET_US);
            self.state.peak_frequency = 0.0;
            self.state.net_distance = 0;
            self.window.clear();
            return;
        }

        self.window.push(time_us as f64);
        if self.window.is_filled() {
            if let Some(freq) = estimate_frequency(&self.window) {
                self.state.peak_frequency = self.state.peak_frequency.max(freq);
            }
        }
    }

    fn status_line(&mut self) -> String {
        format!(
            "Covered distance in device units: {:8} at frequency {:3.1}Hz \t{}",
            self.state.distance(),
            self.state.peak_frequency,
            self.spinner.tick()
        )
    }
}

impl Accumulator for FrequencyEstimator {
    fn handle_event(&mut self, event: &Event) -> Option<String> {
        match event.kind {
            EventKind::Sync => {
                self.handle_sync(event.time_us);
                Some(self.status_line())
            }
            EventKind::Relative if event.code == REL_X => {
                self.state.net_distance = self.state.net_distance.wrapping_add(event.value);
                None
            }
            _ => None,
        }
    }
}
