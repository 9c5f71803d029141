//! SIGINT delivered through a file descriptor
//!
//! The interrupt is blocked for normal delivery and read from a signalfd
//! instead, so the event loop can wait on it together with the device.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use crate::error::ToolError;

/// Non-blocking signalfd reporting SIGINT
pub struct InterruptFd {
    fd: OwnedFd,
}

impl InterruptFd {
    /// Block SIGINT for this thread and open a signalfd for it
    pub fn new() -> Result<Self, ToolError> {
        let fd = unsafe {
            let mut mask: libc::sigset_t = mem::zeroed();
            libc::sigemptyset(&mut mask);
            libc::sigaddset(&mut mask, libc::SIGINT);

            let rc = libc::pthread_sigmask(libc::SIG_BLOCK, &mask, std::ptr::null_mut());
            if rc != 0 {
                return Err(ToolError::Signal(io::Error::from_raw_os_error(rc)));
            }

            let fd = libc::signalfd(-1, &mask, libc::SFD_NONBLOCK | libc::SFD_CLOEXEC);
            if fd < 0 {
                return Err(ToolError::Signal(io::Error::last_os_error()));
            }
            OwnedFd::from_raw_fd(fd)
        };

        Ok(Self { fd })
    }
}

impl AsRawFd for InterruptFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}
