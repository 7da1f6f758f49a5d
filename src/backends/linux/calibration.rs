//! Axis capability probing.
//!
//! Runs once per device at open time:
//! 1. take the device's advertised absolute axes
//! 2. keep the ones below `ABS_MISC`, hats excluded
//! 3. read their ranges and drop axes whose minimum equals their maximum

use crate::codes::is_hat;
use crate::device::AxisCapability;
use crate::error::CapabilityQueryError;
use evdev::raw_stream::RawDevice;
use evdev::AbsoluteAxisCode;
use log::{debug, trace};

/// The parts of `input_absinfo` a capability is built from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AbsRange {
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    pub flat: i32,
}

/// Axis codes worth querying: everything below `ABS_MISC` except the hats.
pub fn candidate_axes(
    supported: impl IntoIterator<Item = AbsoluteAxisCode>,
) -> impl Iterator<Item = AbsoluteAxisCode> {
    supported
        .into_iter()
        .filter(|axis| axis.0 < AbsoluteAxisCode::ABS_MISC.0 && !is_hat(axis.0))
}

/// Turn a kernel range description into a capability, rejecting dead axes.
pub fn capability_from_range(code: u16, range: &AbsRange) -> Option<AxisCapability> {
    if range.minimum == range.maximum {
        return None;
    }
    Some(AxisCapability {
        control: code,
        minimum: range.minimum,
        maximum: range.maximum,
        deadzone_center: range.value,
        deadzone_radius: range.flat,
    })
}

/// Read every usable analog axis of `device`.
pub fn read_axis_capabilities(device: &RawDevice) -> Vec<AxisCapability> {
    let Some(supported) = device.supported_absolute_axes() else {
        return Vec::new();
    };

    let state = match device.get_abs_state() {
        Ok(state) => state,
        Err(source) => {
            debug!("{}", CapabilityQueryError { source });
            return Vec::new();
        }
    };

    let mut axes = Vec::new();
    for axis in candidate_axes(supported.iter()) {
        let Some(info) = state.get(usize::from(axis.0)) else {
            continue;
        };
        let range = AbsRange {
            value: info.value,
            minimum: info.minimum,
            maximum: info.maximum,
            flat: info.flat,
        };
        match capability_from_range(axis.0, &range) {
            Some(cap) => {
                trace!("{axis:?}: {range:?}");
                axes.push(cap);
            }
            None => debug!("{axis:?} has an empty range, skipping"),
        }
    }
    axes
}
