//! Single-threaded measurement loop
//!
//! Waits on the device and the interrupt descriptor with `poll(2)`, drains
//! every pending event into an [`Accumulator`] and redraws the status line
//! after each synchronization event. Returns once SIGINT arrives.

use std::io::{self, Write};
use std::os::unix::io::AsRawFd;

use tracing::{debug, trace};

use crate::device::{EventSource, ReadStatus};
use crate::error::ToolError;
use crate::event::Event;
use crate::signal::InterruptFd;

/// State folded from the event stream
pub trait Accumulator {
    /// Consume one event; returns the status line to redraw on sync events
    fn handle_event(&mut self, event: &Event) -> Option<String>;
}

/// Read events until the source would block
///
/// A kernel overrun is fatal; no attempt is made to resynchronize.
pub fn drain<S, A, W>(source: &mut S, acc: &mut A, out: &mut W) -> Result<(), ToolError>
where
    S: EventSource + ?Sized,
    A: Accumulator + ?Sized,
    W: Write + ?Sized,
{
    loop {
        match source.next_event()? {
            ReadStatus::Event(ev) => {
                trace!(?ev, "event");
                if let Some(line) = acc.handle_event(&ev) {
                    write!(out, "\r{line}")?;
                    out.flush()?;
                }
            }
            ReadStatus::WouldBlock => return Ok(()),
            ReadStatus::SyncDropped => return Err(ToolError::CannotKeepUp),
        }
    }
}

/// Run until interrupted
pub fn run<S, A, W>(
    source: &mut S,
    interrupt: &InterruptFd,
    acc: &mut A,
    out: &mut W,
) -> Result<(), ToolError>
where
    S: EventSource + AsRawFd,
    A: Accumulator,
    W: Write,
{
    let mut fds = [
        libc::pollfd {
            fd: source.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: interrupt.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
    ];

    loop {
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(ToolError::Signal(err));
        }

        if fds[1].revents != 0 {
            debug!("Interrupt received, leaving event loop");
            return Ok(());
        }

        drain(source, acc, out)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::fs::File;
    use std::io::Read;
    use std::os::fd::{FromRawFd, OwnedFd};

    struct Script(VecDeque<Result<ReadStatus, ToolError>>);

    impl EventSource for Script {
        fn next_event(&mut self) -> Result<ReadStatus, ToolError> {
            self.0.pop_front().unwrap_or(Ok(ReadStatus::WouldBlock))
        }
    }

    #[derive(Default)]
    struct Counter {
        events: usize,
        syncs: usize,
    }

    impl Accumulator for Counter {
        fn handle_event(&mut self, event: &Event) -> Option<String> {
            self.events += 1;
            if event.kind == crate::event::EventKind::Sync {
                self.syncs += 1;
                Some(format!("sync {}", self.syncs))
            } else {
                None
            }
        }
    }

    #[test]
    fn test_drain_redraws_on_sync() {
        let mut source = Script(
            vec![
                Ok(ReadStatus::Event(Event::relative(0, 1, 0))),
                Ok(ReadStatus::Event(Event::sync(0))),
                Ok(ReadStatus::Event(Event::sync(1))),
            ]
            .into(),
        );
        let mut acc = Counter::default();
        let mut out = Vec::new();

        drain(&mut source, &mut acc, &mut out).unwrap();

        assert_eq!(acc.events, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "\rsync 1\rsync 2");
    }

    #[test]
    fn test_drain_stops_at_would_block() {
        let mut source = Script(
            vec![
                Ok(ReadStatus::Event(Event::sync(0))),
                Ok(ReadStatus::WouldBlock),
                Ok(ReadStatus::Event(Event::sync(1))),
            ]
            .into(),
        );
        let mut acc = Counter::default();
        drain(&mut source, &mut acc, &mut Vec::<u8>::new()).unwrap();
        assert_eq!(acc.syncs, 1);
    }

    #[test]
    fn test_drain_sync_dropped_is_fatal() {
        let mut source = Script(
            vec![
                Ok(ReadStatus::Event(Event::sync(0))),
                Ok(ReadStatus::SyncDropped),
                Ok(ReadStatus::Event(Event::sync(1))),
            ]
            .into(),
        );
        let mut acc = Counter::default();
        let err = drain(&mut source, &mut acc, &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, ToolError::CannotKeepUp));
        assert_eq!(acc.syncs, 1);
    }

    /// Read end of a non-blocking pipe; every byte becomes one sync event
    struct PipeSource {
        read: File,
    }

    impl EventSource for PipeSource {
        fn next_event(&mut self) -> Result<ReadStatus, ToolError> {
            let mut byte = [0u8; 1];
            match self.read.read(&mut byte) {
                Ok(1) => Ok(ReadStatus::Event(Event::sync(u64::from(byte[0])))),
                Ok(_) => Ok(ReadStatus::WouldBlock),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(ReadStatus::WouldBlock),
                Err(e) => Err(ToolError::Read(e)),
            }
        }
    }

    impl AsRawFd for PipeSource {
        fn as_raw_fd(&self) -> std::os::unix::io::RawFd {
            self.read.as_raw_fd()
        }
    }

    fn pipe_source() -> (PipeSource, File) {
        let mut fds = [0; 2];
        let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_NONBLOCK | libc::O_CLOEXEC) };
        assert_eq!(rc, 0, "pipe2: {}", io::Error::last_os_error());
        let (read, write) = unsafe {
            (
                File::from(OwnedFd::from_raw_fd(fds[0])),
                File::from(OwnedFd::from_raw_fd(fds[1])),
            )
        };
        (PipeSource { read }, write)
    }

    /// Raises SIGINT on this thread once `after` events were seen
    struct InterruptAfter {
        inner: Counter,
        after: usize,
    }

    impl Accumulator for InterruptAfter {
        fn handle_event(&mut self, event: &Event) -> Option<String> {
            let line = self.inner.handle_event(event);
            if self.inner.events == self.after {
                unsafe { libc::raise(libc::SIGINT) };
            }
            line
        }
    }

    // SIGINT is blocked per thread by InterruptFd::new and raise() targets
    // the calling thread, so these tests stay isolated from each other.

    #[test]
    fn test_run_returns_on_pending_interrupt() {
        let (mut source, mut write) = pipe_source();
        write.write_all(&[1, 2]).unwrap();

        let interrupt = InterruptFd::new().unwrap();
        assert_eq!(unsafe { libc::raise(libc::SIGINT) }, 0);

        let mut acc = Counter::default();
        let mut out = Vec::<u8>::new();
        run(&mut source, &interrupt, &mut acc, &mut out).unwrap();

        // The interrupt wins over pending device data
        assert_eq!(acc.events, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_drains_device_before_interrupt() {
        let (mut source, mut write) = pipe_source();
        write.write_all(&[10, 20, 30]).unwrap();

        let interrupt = InterruptFd::new().unwrap();
        let mut acc = InterruptAfter {
            inner: Counter::default(),
            after: 1,
        };
        let mut out = Vec::<u8>::new();
        run(&mut source, &interrupt, &mut acc, &mut out).unwrap();

        // The signal arrived during the first event, the rest of the batch
        // is still drained before the loop notices it
        assert_eq!(acc.inner.events, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "\rsync 1\rsync 2\rsync 3");
    }

    #[test]
    fn test_run_propagates_overrun() {
        let mut source = Script(vec![Ok(ReadStatus::SyncDropped)].into());
        let (ready, mut write) = pipe_source();
        write.write_all(&[0]).unwrap();

        // Script has no descriptor of its own; borrow the readable pipe's
        struct Ready<'a> {
            script: &'a mut Script,
            fd: &'a PipeSource,
        }
        impl EventSource for Ready<'_> {
            fn next_event(&mut self) -> Result<ReadStatus, ToolError> {
                self.script.next_event()
            }
        }
        impl AsRawFd for Ready<'_> {
            fn as_raw_fd(&self) -> std::os::unix::io::RawFd {
                self.fd.as_raw_fd()
            }
        }

        let interrupt = InterruptFd::new().unwrap();
        let mut source = Ready {
            script: &mut source,
            fd: &ready,
        };
        let err = run(&mut source, &interrupt, &mut Counter::default(), &mut Vec::<u8>::new())
            .unwrap_err();
        assert!(matches!(err, ToolError::CannotKeepUp));
    }

    #[test]
    fn test_drain_propagates_read_error() {
        let mut source = Script(
            vec![Err(ToolError::Read(io::Error::from_raw_os_error(libc::ENODEV)))].into(),
        );
        let err = drain(&mut source, &mut Counter::default(), &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, ToolError::Read(_)));
    }
}
