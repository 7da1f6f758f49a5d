//! Error types.
//!
//! Almost every failure in StickPad is absorbed where it happens: a device that
//! cannot be opened is skipped, a device that stops reading is torn down, an
//! axis whose range cannot be queried is omitted. These types exist so that the
//! boundary doing the absorbing can log something precise.
//!
//! The only error a caller normally has to handle is [`ConfigError`].

use std::io;
use thiserror::Error;

/// Failure to open a device node as an input reader.
///
/// The manager treats every variant the same way: log and skip the device.
#[derive(Debug, Error)]
pub enum DeviceOpenError {
    #[error("device node {path} does not exist")]
    NotFound { path: String },

    #[error("permission denied opening {path}")]
    PermissionDenied { path: String },

    #[error("{path} is not an input event device")]
    NotInputDevice { path: String },

    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl DeviceOpenError {
    /// Classify an `open(2)` failure for `path`.
    pub fn from_io(path: &str, source: io::Error) -> Self {
        let path = path.to_string();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}

/// A device stopped producing data and must be closed.
#[derive(Debug, Error)]
pub enum DeviceLost {
    #[error("end of stream")]
    EndOfStream,

    #[error("read failed: {0}")]
    Read(#[source] io::Error),
}

/// The hotplug notification service could not be reached.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("device notification service unavailable: {0}")]
    Unavailable(#[source] io::Error),

    #[error("device enumeration failed: {0}")]
    Enumeration(#[source] io::Error),
}

/// Axis ranges could not be read. The device is kept, without analog axes.
#[derive(Debug, Error)]
#[error("absolute axis query failed: {source}")]
pub struct CapabilityQueryError {
    #[source]
    pub source: io::Error,
}

/// An action was queried in a way its bindings cannot answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionQueryError {
    #[error("no bindings for action {0:?}")]
    UnknownAction(String),

    #[error("action {0:?} is not bound to a gamepad axis")]
    NotAnAxis(String),
}

/// Failure to load a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
