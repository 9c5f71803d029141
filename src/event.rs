//! Typed input events
//!
//! The accumulators never see raw evdev structures. The device session
//! converts each `evdev::InputEvent` into an [`Event`] carrying only what
//! the measurements need.

use std::time::UNIX_EPOCH;

use evdev::{EventType, InputEvent};

/// SYN_DROPPED: kernel buffer overrun
pub const SYN_DROPPED: u16 = 0x03;

pub const REL_X: u16 = 0x00;

pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;

/// Event class relevant to the measurement tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// EV_SYN
    Sync,
    /// EV_REL
    Relative,
    /// EV_ABS
    Absolute,
    /// Anything else, carrying the raw event type
    Other(u16),
}

/// One decoded input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
    /// Kernel timestamp in microseconds since the epoch
    pub time_us: u64,
}

impl Event {
    pub fn sync(time_us: u64) -> Self {
        Self {
            kind: EventKind::Sync,
            code: 0,
            value: 0,
            time_us,
        }
    }

    pub fn relative(code: u16, value: i32, time_us: u64) -> Self {
        Self {
            kind: EventKind::Relative,
            code,
            value,
            time_us,
        }
    }

    pub fn absolute(code: u16, value: i32, time_us: u64) -> Self {
        Self {
            kind: EventKind::Absolute,
            code,
            value,
            time_us,
        }
    }

    /// True for SYN_DROPPED, which must not reach an accumulator
    pub fn is_sync_dropped(&self) -> bool {
        self.kind == EventKind::Sync && self.code == SYN_DROPPED
    }
}

impl From<InputEvent> for Event {
    fn from(ev: InputEvent) -> Self {
        let kind = match ev.event_type() {
            EventType::SYNCHRONIZATION => EventKind::Sync,
            EventType::RELATIVE => EventKind::Relative,
            EventType::ABSOLUTE => EventKind::Absolute,
            other => EventKind::Other(other.0),
        };
        let time_us = ev
            .timestamp()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);

        Self {
            kind,
            code: ev.code(),
            value: ev.value(),
            time_us,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_event_relative() {
        let raw = InputEvent::new(EventType::RELATIVE, REL_X, -4);
        let ev = Event::from(raw);
        assert_eq!(ev.kind, EventKind::Relative);
        assert_eq!(ev.code, REL_X);
        assert_eq!(ev.value, -4);
    }

    #[test]
    fn test_from_input_event_other_type() {
        let raw = InputEvent::new(EventType::KEY, 0x110, 1);
        let ev = Event::from(raw);
        assert_eq!(ev.kind, EventKind::Other(EventType::KEY.0));
    }

    #[test]
    fn test_sync_dropped_detection() {
        let mut ev = Event::sync(0);
        assert!(!ev.is_sync_dropped());
        ev.code = SYN_DROPPED;
        assert!(ev.is_sync_dropped());
    }
}
