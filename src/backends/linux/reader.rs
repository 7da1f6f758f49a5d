//! evdev device reader.
//!
//! [`EvdevReader`] owns one non-blocking `/dev/input/event*` device and turns
//! its event stream into [`RawInputEvent`]s. It is responsible for:
//! - opening the node and rejecting anything that is not an evdev device
//! - probing axis ranges once (see [`calibration`](super::calibration))
//! - draining a bounded number of reads per wakeup
//! - classifying events into buttons, axes, hats and balls
//!
//! It keeps no input state; that is the aggregator's job.

use super::calibration;
use crate::codes::is_hat;
use crate::config::ReaderConfig;
use crate::device::{AxisCapability, Device, ReadOutcome};
use crate::error::{DeviceLost, DeviceOpenError};
use crate::event::{EventKind, RawInputEvent};
use evdev::raw_stream::RawDevice;
use evdev::{AbsoluteAxisCode, EventType, InputEvent, KeyCode, RelativeAxisCode};
use log::{debug, warn};
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::time::{SystemTime, UNIX_EPOCH};

/// Event timestamp as microseconds (`tv_sec * 1_000_000 + tv_usec`).
pub fn time_micros(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Classify a kernel event. Returns `None` for everything a gamepad state does not track.
pub fn decode(event: &InputEvent) -> Option<RawInputEvent> {
    let code = event.code();
    let event_type = event.event_type();
    let kind = if event_type == EventType::KEY && code >= KeyCode::BTN_0.0 { // BTN_MISC == BTN_0 (0x100)
        EventKind::Button
    } else if event_type == EventType::ABSOLUTE && is_hat(code) {
        EventKind::Hat
    } else if event_type == EventType::ABSOLUTE && code < AbsoluteAxisCode::ABS_MISC.0 {
        EventKind::Axis
    } else if event_type == EventType::RELATIVE
        && (code == RelativeAxisCode::REL_X.0 || code == RelativeAxisCode::REL_Y.0)
    {
        EventKind::Ball
    } else {
        return None;
    };

    Some(RawInputEvent {
        time: time_micros(event.timestamp()),
        kind,
        control: code,
        value: event.value(),
    })
}

/// Something that yields one batch of events per `read(2)`.
pub trait EventSource {
    fn fetch(&mut self) -> io::Result<Vec<InputEvent>>;
}

// Raw stream: every read is one batch, partial frames included, so an empty
// batch only ever means a zero-length read.
impl EventSource for RawDevice {
    fn fetch(&mut self) -> io::Result<Vec<InputEvent>> {
        Ok(self.fetch_events()?.collect())
    }
}

/// Read until the source would block, at most `max_reads` times.
///
/// An empty batch is a zero-length read, i.e. end of stream. Events decoded
/// before a loss are still returned.
pub fn drain(source: &mut impl EventSource, max_reads: usize, path: &str) -> ReadOutcome {
    let mut events = Vec::new();
    let mut reads = 0;

    while reads < max_reads {
        match source.fetch() {
            Ok(batch) if batch.is_empty() => {
                warn!("{path}: got EOF from the input device");
                return ReadOutcome {
                    events,
                    lost: Some(DeviceLost::EndOfStream),
                };
            }
            Ok(batch) => {
                reads += 1;
                events.extend(batch.iter().filter_map(decode));
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => {
                warn!("{path}: could not read from input device: {e}");
                return ReadOutcome {
                    events,
                    lost: Some(DeviceLost::Read(e)),
                };
            }
        }
    }

    ReadOutcome::events(events)
}

fn set_nonblocking(device: &RawDevice) -> io::Result<()> {
    let fd = device.as_raw_fd();

    // Keep the flags evdev opened with.
    let current = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if current < 0 {
        return Err(io::Error::last_os_error());
    }
    let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, current | libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn open_error(path: &str, source: io::Error) -> DeviceOpenError {
    match source.raw_os_error() {
        // The capability ioctls evdev issues on open fail like this on
        // anything that is not an event device.
        Some(libc::ENOTTY) | Some(libc::EINVAL) => DeviceOpenError::NotInputDevice {
            path: path.to_string(),
        },
        _ => DeviceOpenError::from_io(path, source),
    }
}

/// Concrete evdev-backed device implementing [`Device`].
pub struct EvdevReader {
    path: String,
    device: RawDevice,
    axes: Vec<AxisCapability>,
    max_reads: usize,
}

impl EvdevReader {
    /// Open `path` non-blocking and probe its axes.
    pub fn open(path: &str, config: &ReaderConfig) -> Result<Self, DeviceOpenError> {
        let device = RawDevice::open(path).map_err(|e| open_error(path, e))?;
        set_nonblocking(&device).map_err(|e| DeviceOpenError::from_io(path, e))?;

        let axes = calibration::read_axis_capabilities(&device);
        debug!(
            "{path}: opened {:?} with {} axis capabilities",
            device.name().unwrap_or("unknown"),
            axes.len()
        );

        Ok(Self {
            path: path.to_string(),
            device,
            axes,
            max_reads: config.max_reads_per_wakeup.max(1),
        })
    }
}

impl Device for EvdevReader {
    fn poll(&mut self) -> ReadOutcome {
        drain(&mut self.device, self.max_reads, &self.path)
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn axes(&self) -> &[AxisCapability] {
        &self.axes
    }

    fn raw_fd(&self) -> Option<RawFd> {
        Some(self.device.as_raw_fd())
    }
}
