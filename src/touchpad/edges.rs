//! Running min/max of absolute touchpad coordinates

use crate::event::{Event, EventKind, ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_X, ABS_Y};
use crate::event_loop::Accumulator;
use crate::spinner::Spinner;

/// Observed coordinate range
///
/// Starts as an empty (inverted) range so the first sample on each axis
/// sets both of its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionState {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Default for DimensionState {
    fn default() -> Self {
        Self {
            left: i32::MAX,
            right: i32::MIN,
            top: i32::MAX,
            bottom: i32::MIN,
        }
    }
}

impl DimensionState {
    /// Whether any X sample has been seen
    pub fn has_x(&self) -> bool {
        self.right >= self.left
    }

    /// Whether any Y sample has been seen
    pub fn has_y(&self) -> bool {
        self.bottom >= self.top
    }

    pub fn add_x(&mut self, value: i32) {
        self.left = self.left.min(value);
        self.right = self.right.max(value);
    }

    pub fn add_y(&mut self, value: i32) {
        self.top = self.top.min(value);
        self.bottom = self.bottom.max(value);
    }

    pub fn width(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.bottom) - i64::from(self.top)
    }
}

/// Touchpad accumulator
#[derive(Debug, Default)]
pub struct EdgeDetector {
    dim: DimensionState,
    spinner: Spinner,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(&self) -> &DimensionState {
        &self.dim
    }

    pub fn into_dimensions(self) -> DimensionState {
        self.dim
    }

    fn status_line(&mut self) -> String {
        format!(
            "Touchpad sends:\tx [{}..{}], y [{}..{}] {}",
            self.dim.left,
            self.dim.right,
            self.dim.top,
            self.dim.bottom,
            self.spinner.tick()
        )
    }
}

impl Accumulator for EdgeDetector {
    fn handle_event(&mut self, event: &Event) -> Option<String> {
        match (event.kind, event.code) {
            (EventKind::Sync, _) => return Some(self.status_line()),
            (EventKind::Absolute, ABS_X | ABS_MT_POSITION_X) => self.dim.add_x(event.value),
            (EventKind::Absolute, ABS_Y | ABS_MT_POSITION_Y) => self.dim.add_y(event.value),
            _ => {}
        }
        None
    }
}
