//! Input device session
//!
//! Wraps an evdev raw device: opens the node, checks that no other process
//! holds an exclusive grab, snapshots its capabilities and hands out decoded
//! events. The device is closed when the session is dropped.

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::mem;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

use evdev::raw_stream::RawDevice;
use evdev::{AbsoluteAxisType, EventType, InputEvent, LedType};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::event::Event;

/// Bus the device is attached through (linux/input.h BUS_*)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bus {
    Pci,
    IsaPnp,
    Usb,
    Hil,
    Bluetooth,
    Virtual,
    Other(u16),
}

impl Default for Bus {
    fn default() -> Self {
        Bus::Other(0)
    }
}

impl Bus {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0x01 => Bus::Pci,
            0x02 => Bus::IsaPnp,
            0x03 => Bus::Usb,
            0x04 => Bus::Hil,
            0x05 => Bus::Bluetooth,
            0x06 => Bus::Virtual,
            other => Bus::Other(other),
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            Bus::Pci => 0x01,
            Bus::IsaPnp => 0x02,
            Bus::Usb => 0x03,
            Bus::Hil => 0x04,
            Bus::Bluetooth => 0x05,
            Bus::Virtual => 0x06,
            Bus::Other(raw) => raw,
        }
    }

    /// Name as used in hwdb match strings
    pub fn name(self) -> &'static str {
        match self {
            Bus::Pci => "pci",
            Bus::IsaPnp => "isapnp",
            Bus::Usb => "usb",
            Bus::Hil => "hil",
            Bus::Bluetooth => "bluetooth",
            Bus::Virtual => "virtual",
            Bus::Other(_) => "unknown bus type",
        }
    }
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Range and resolution of one absolute axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisInfo {
    pub minimum: i32,
    pub maximum: i32,
    /// Units per millimeter, 0 if the kernel does not know
    pub resolution: i32,
}

impl AxisInfo {
    /// Physical length in mm, if the resolution is known
    pub fn size_mm(&self) -> Option<i32> {
        (self.resolution != 0).then(|| (self.maximum - self.minimum) / self.resolution)
    }
}

/// Full kernel absinfo of one axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsSettings {
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub resolution: i32,
}

impl From<libc::input_absinfo> for AbsSettings {
    fn from(abs: libc::input_absinfo) -> Self {
        Self {
            value: abs.value,
            minimum: abs.minimum,
            maximum: abs.maximum,
            fuzz: abs.fuzz,
            flat: abs.flat,
            resolution: abs.resolution,
        }
    }
}

impl From<AbsSettings> for libc::input_absinfo {
    fn from(abs: AbsSettings) -> Self {
        libc::input_absinfo {
            value: abs.value,
            minimum: abs.minimum,
            maximum: abs.maximum,
            fuzz: abs.fuzz,
            flat: abs.flat,
            resolution: abs.resolution,
        }
    }
}

/// Static device metadata queried once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub name: String,
    pub bus: Bus,
    pub vendor: u16,
    pub product: u16,
    pub x: Option<AxisInfo>,
    pub y: Option<AxisInfo>,
    pub mt_x: Option<AxisInfo>,
    pub mt_y: Option<AxisInfo>,
}

impl DeviceCapabilities {
    pub fn has_abs_xy(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    pub fn has_mt_position(&self) -> bool {
        self.mt_x.is_some() && self.mt_y.is_some()
    }
}

/// Outcome of one read attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    Event(Event),
    /// Nothing more to read until the descriptor becomes ready again
    WouldBlock,
    /// The kernel dropped events because the reader fell behind
    SyncDropped,
}

/// Source of decoded input events
pub trait EventSource {
    fn next_event(&mut self) -> Result<ReadStatus, ToolError>;
}

/// Open evdev device plus a buffer of fetched events
pub struct DeviceSession {
    device: RawDevice,
    path: String,
    pending: VecDeque<Event>,
}

impl DeviceSession {
    /// Open `path` non-blocking and load the evdev state
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ToolError> {
        let path = path.as_ref();

        let device = RawDevice::open(path).map_err(classify_open_error)?;
        set_nonblocking(device.as_raw_fd()).map_err(ToolError::DeviceInfo)?;

        debug!("Opened {} ({:?})", path.display(), device.name());

        Ok(Self {
            device,
            path: path.display().to_string(),
            pending: VecDeque::new(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Grab the device and release it again
    ///
    /// Fails if another process already holds the grab.
    pub fn check_grab(&mut self) -> Result<(), ToolError> {
        self.device.grab().map_err(|source| ToolError::Grab {
            path: self.path.clone(),
            source,
        })?;
        if let Err(e) = self.device.ungrab() {
            warn!("Failed to release grab on {}: {}", self.path, e);
        }
        debug!("Grab check on {} succeeded", self.path);
        Ok(())
    }

    /// Snapshot name, ids and absolute axis ranges
    pub fn capabilities(&self) -> Result<DeviceCapabilities, ToolError> {
        let id = self.device.input_id();
        let mut caps = DeviceCapabilities {
            name: self.name().to_string(),
            bus: Bus::from_raw(id.bus_type().0),
            vendor: id.vendor(),
            product: id.product(),
            ..DeviceCapabilities::default()
        };

        let Some(axes) = self.device.supported_absolute_axes() else {
            return Ok(caps);
        };
        let state = self.device.get_abs_state().map_err(ToolError::DeviceInfo)?;
        let info = |axis: AbsoluteAxisType| {
            axes.contains(axis).then(|| {
                let abs = &state[axis.0 as usize];
                AxisInfo {
                    minimum: abs.minimum,
                    maximum: abs.maximum,
                    resolution: abs.resolution,
                }
            })
        };

        caps.x = info(AbsoluteAxisType::ABS_X);
        caps.y = info(AbsoluteAxisType::ABS_Y);
        caps.mt_x = info(AbsoluteAxisType::ABS_MT_POSITION_X);
        caps.mt_y = info(AbsoluteAxisType::ABS_MT_POSITION_Y);
        Ok(caps)
    }

    pub fn name(&self) -> &str {
        self.device.name().unwrap_or("Unnamed device")
    }

    /// Current absinfo of `axis`, `None` if the device lacks the axis
    pub fn abs_settings(&self, axis: AbsoluteAxisType) -> Result<Option<AbsSettings>, ToolError> {
        if !self
            .device
            .supported_absolute_axes()
            .is_some_and(|axes| axes.contains(axis))
        {
            return Ok(None);
        }
        let state = self.device.get_abs_state().map_err(ToolError::DeviceInfo)?;
        Ok(Some(AbsSettings::from(state[axis.0 as usize])))
    }

    /// Replace the kernel absinfo of `axis`
    pub fn set_abs_settings(&self, axis: AbsoluteAxisType, settings: AbsSettings) -> io::Result<()> {
        let info = libc::input_absinfo::from(settings);
        let rc = unsafe {
            libc::ioctl(
                self.device.as_raw_fd(),
                eviocsabs(axis.0) as _,
                &info as *const libc::input_absinfo,
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        debug!("Set {:?} on {} to {:?}", axis, self.path, settings);
        Ok(())
    }

    pub fn has_led(&self, led: LedType) -> bool {
        self.device.supported_leds().is_some_and(|leds| leds.contains(led))
    }

    /// Switch an LED, followed by a SYN_REPORT
    pub fn set_led(&mut self, led: LedType, on: bool) -> io::Result<()> {
        self.device.send_events(&[
            InputEvent::new(EventType::LED, led.0, i32::from(on)),
            InputEvent::new(EventType::SYNCHRONIZATION, 0, 0),
        ])?;
        debug!("Set {:?} on {} to {}", led, self.path, on);
        Ok(())
    }

    fn refill(&mut self) -> io::Result<()> {
        let events = self.device.fetch_events()?;
        self.pending.extend(events.map(Event::from));
        Ok(())
    }
}

impl EventSource for DeviceSession {
    fn next_event(&mut self) -> Result<ReadStatus, ToolError> {
        if self.pending.is_empty() {
            match self.refill() {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(ReadStatus::WouldBlock)
                }
                Err(e) => return Err(ToolError::Read(e)),
            }
        }

        match self.pending.pop_front() {
            Some(ev) if ev.is_sync_dropped() => Ok(ReadStatus::SyncDropped),
            Some(ev) => Ok(ReadStatus::Event(ev)),
            None => Ok(ReadStatus::WouldBlock),
        }
    }
}

impl AsRawFd for DeviceSession {
    fn as_raw_fd(&self) -> RawFd {
        self.device.as_raw_fd()
    }
}

// From linux/input.h:
// #define EVIOCSABS(abs) _IOW('E', 0xc0 + (abs), struct input_absinfo)

const EVDEV_MAGIC: u8 = b'E';

fn eviocsabs(axis: u16) -> libc::c_ulong {
    // Direction: 2 bits at 30-31, Size: 14 bits at 16-29, Type: 8 bits at 8-15, Nr: 8 bits at 0-7
    let dir: u32 = 1; // _IOC_WRITE
    let size = (mem::size_of::<libc::input_absinfo>() as u32) & 0x3FFF;
    let typ = EVDEV_MAGIC as u32;
    let nr = 0xc0 + u32::from(axis);
    ((dir << 30) | (size << 16) | (typ << 8) | nr) as libc::c_ulong
}

/// Split a failed open into "cannot open the node" and "not an evdev device"
///
/// `RawDevice::open` opens the node and then queries it; errors from the
/// open itself are path or permission problems, anything else came from the
/// evdev ioctls.
fn classify_open_error(err: io::Error) -> ToolError {
    match err.raw_os_error() {
        Some(
            libc::ENOENT
            | libc::ENOTDIR
            | libc::EACCES
            | libc::EPERM
            | libc::EISDIR
            | libc::ELOOP
            | libc::ENAMETOOLONG
            | libc::ENXIO
            | libc::EROFS
            | libc::EBUSY,
        ) => ToolError::Open(err),
        _ => ToolError::DeviceInfo(err),
    }
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_names() {
        assert_eq!(Bus::from_raw(0x03).name(), "usb");
        assert_eq!(Bus::from_raw(0x05).name(), "bluetooth");
        assert_eq!(Bus::from_raw(0x01).to_string(), "pci");
        assert_eq!(Bus::from_raw(0x18).name(), "unknown bus type");
        assert_eq!(Bus::from_raw(0x18).raw(), 0x18);
    }

    #[test]
    fn test_axis_size() {
        let axis = AxisInfo {
            minimum: 1000,
            maximum: 5000,
            resolution: 40,
        };
        assert_eq!(axis.size_mm(), Some(100));
        let unknown = AxisInfo {
            resolution: 0,
            ..axis
        };
        assert_eq!(unknown.size_mm(), None);
    }

    #[test]
    fn test_open_missing_path() {
        let err = DeviceSession::open("/nonexistent/input/event99")
            .err()
            .unwrap();
        assert!(matches!(err, ToolError::Open(_)));
        assert!(err.to_string().starts_with("Error opening the device:"));
    }

    #[test]
    fn test_eviocsabs_request() {
        // Values from linux/input.h on the generic ioctl layout
        assert_eq!(eviocsabs(0x00), 0x401845c0);
        assert_eq!(eviocsabs(0x35), 0x401845f5);
    }

    #[test]
    fn test_abs_settings_round_trip_through_absinfo() {
        let settings = AbsSettings {
            value: 7,
            minimum: -100,
            maximum: 4000,
            fuzz: 8,
            flat: 2,
            resolution: 42,
        };
        let raw = libc::input_absinfo::from(settings);
        assert_eq!((raw.minimum, raw.fuzz, raw.resolution), (-100, 8, 42));
        assert_eq!(AbsSettings::from(raw), settings);
    }

    #[test]
    fn test_classify_open_error() {
        for errno in [libc::ENOENT, libc::EACCES, libc::EPERM, libc::EISDIR] {
            let err = classify_open_error(io::Error::from_raw_os_error(errno));
            assert!(matches!(err, ToolError::Open(_)), "errno {errno}");
        }
        for errno in [libc::ENOTTY, libc::EINVAL, libc::ENODEV] {
            let err = classify_open_error(io::Error::from_raw_os_error(errno));
            assert!(matches!(err, ToolError::DeviceInfo(_)), "errno {errno}");
        }
        let custom = io::Error::new(io::ErrorKind::Other, "no name");
        assert!(matches!(classify_open_error(custom), ToolError::DeviceInfo(_)));
    }

    #[test]
    fn test_open_non_evdev_node() {
        // Readable but not an input device
        let err = DeviceSession::open("/dev/null").err().unwrap();
        assert!(matches!(err, ToolError::DeviceInfo(_)));
    }

    #[test]
    #[ignore] // Requires a readable /dev/input/event0 (run with: cargo test -- --ignored)
    fn test_open_real_device() {
        let mut session = DeviceSession::open("/dev/input/event0").unwrap();
        session.check_grab().unwrap();
        let caps = session.capabilities().unwrap();
        assert!(!caps.name.is_empty());
    }
}
