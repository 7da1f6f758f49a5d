//! StickPad: gamepad and joystick input for Linux.
//!
//! Discovers evdev devices (with udev hotplug), reads and calibrates them,
//! aggregates their input into queryable state and maps named actions onto
//! physical inputs with edge-triggered notifications.
//!
//! Start with [`InputHub`](hub::InputHub) and
//! [`platform_backend`](backends::platform_backend).

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backends;
pub mod binding;
pub mod codes;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod hub;
pub mod logger;
pub mod manager;
pub mod snapshot;
pub mod state;

pub use binding::*;
pub use config::Config;
pub use device::*;
pub use event::*;
pub use eventbus::*;
pub use hub::InputHub;
pub use manager::*;
pub use snapshot::Snapshot;
pub use state::InputState;
