//! Synthetic buttons produced by decomposing hats.
//!
//! Kernel event codes come from [`evdev`]'s code types (`KeyCode`,
//! `AbsoluteAxisCode`, `RelativeAxisCode`). Hats are the one thing StickPad
//! invents: each of the first three hats owns four consecutive button codes
//! starting at [`hat::HAT_BUTTON_BASE`] (up, down, left, right), so they can
//! be bound and queried like any other button.

use evdev::AbsoluteAxisCode;

/// Returns `true` for the eight `ABS_HAT*` codes.
#[inline]
pub fn is_hat(code: u16) -> bool {
    (AbsoluteAxisCode::ABS_HAT0X.0..=AbsoluteAxisCode::ABS_HAT3Y.0).contains(&code)
}

pub mod hat {
    use evdev::AbsoluteAxisCode;

    pub const HAT_BUTTON_BASE: u16 = 0x255;
    /// Number of hats decomposed into buttons.
    pub const HAT_PAIRS: u16 = 3;

    pub const UP: u16 = 0;
    pub const DOWN: u16 = 1;
    pub const LEFT: u16 = 2;
    pub const RIGHT: u16 = 3;

    /// Button code for `direction` on hat `pair` (0-based).
    #[inline]
    pub const fn button(pair: u16, direction: u16) -> u16 {
        HAT_BUTTON_BASE + pair * 4 + direction
    }

    /// Which channel of which hat an `ABS_HAT*` code reports.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Channel {
        pub pair: u16,
        /// `true` for the X (left/right) channel.
        pub horizontal: bool,
    }

    impl Channel {
        /// `(negative, positive)` direction buttons of this channel.
        pub const fn buttons(&self) -> (u16, u16) {
            if self.horizontal {
                (button(self.pair, LEFT), button(self.pair, RIGHT))
            } else {
                (button(self.pair, UP), button(self.pair, DOWN))
            }
        }
    }

    /// Map an axis code onto a decomposed hat channel. `None` for non-hat
    /// codes and for the fourth hat.
    pub fn channel(code: u16) -> Option<Channel> {
        let offset = code.checked_sub(AbsoluteAxisCode::ABS_HAT0X.0)?;
        let pair = offset / 2;
        (pair < HAT_PAIRS).then_some(Channel {
            pair,
            horizontal: offset % 2 == 0,
        })
    }

    pub const UP1: u16 = button(0, UP);
    pub const DOWN1: u16 = button(0, DOWN);
    pub const LEFT1: u16 = button(0, LEFT);
    pub const RIGHT1: u16 = button(0, RIGHT);
    pub const UP2: u16 = button(1, UP);
    pub const DOWN2: u16 = button(1, DOWN);
    pub const LEFT2: u16 = button(1, LEFT);
    pub const RIGHT2: u16 = button(1, RIGHT);
    pub const UP3: u16 = button(2, UP);
    pub const DOWN3: u16 = button(2, DOWN);
    pub const LEFT3: u16 = button(2, LEFT);
    pub const RIGHT3: u16 = button(2, RIGHT);
}
