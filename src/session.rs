//! Device session: what the host knows about one booster.
//!
//! The session turns each operation into the packet(s) to send, applying the
//! booster's argument policy on the way: hue and LED count are clamped, and any
//! index or range outside `0..=last_index` makes the whole operation a no-op
//! (`None`). No error is ever raised for bad arguments.
//!
//! The session never mirrors the staged color. The booster owns it, and a
//! hardware reset would leave a local copy stale.

use smart_leds::RGB8;

use crate::command::{Opcode, Packet};
use crate::config::{BoosterConfig, LED_DELAY_US, ShiftUpOpcode};
use crate::gradient::Gradient;

/// Packets sent by `init`: always `INIT`, then `RGBORDER` when the color order needs it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InitPackets {
    /// The `INIT` command.
    pub init: Packet,
    /// The `RGBORDER` command, for RGB LEDs not in GRB order.
    pub rgb_order: Option<Packet>,
}

impl InitPackets {
    /// The packets in send order.
    pub fn iter(&self) -> impl Iterator<Item = Packet> + '_ {
        core::iter::once(self.init).chain(self.rgb_order)
    }
}

/// Configured state of one booster.
///
/// Create it with [`Session::new`], then call [`Session::init`] before using the
/// addressing operations. Uninitialized sessions still encode commands (the
/// firmware simply ignores them) but log a warning.
///
/// # Example
///
/// ```
/// use dd_booster::{BoosterConfig, Session};
///
/// let mut session = Session::new();
/// let init = session.init(&BoosterConfig::new(10));
/// assert_eq!(init.init.as_bytes(), &[0xB1, 10, 24]);
/// assert_eq!(session.last_index(), 9);
///
/// assert!(session.set_led(9).is_some());
/// assert!(session.set_led(10).is_none()); // past the strip: skipped
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session {
    last_index: u8,
    initialized: bool,
    shift_up_opcode: ShiftUpOpcode,
}

impl Session {
    /// A session that has not been initialized yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_index: 0,
            initialized: false,
            shift_up_opcode: ShiftUpOpcode::ShiftDown,
        }
    }

    /// Record `config` and build the packets that configure the booster.
    ///
    /// The LED count is clamped to `1..=256`; the wire count is rounded up to
    /// an even number and 256 goes out as 0.
    pub fn init(&mut self, config: &BoosterConfig) -> InitPackets {
        let count = config.effective_led_count();
        // count is in 1..=256
        self.last_index = u8::try_from(count - 1).unwrap_or(u8::MAX);
        self.shift_up_opcode = config.shift_up_opcode;
        self.initialized = true;

        InitPackets {
            init: Packet::init(config.wire_led_count(), config.led_type),
            rgb_order: config.needs_rgb_order().then(Packet::rgb_order),
        }
    }

    /// Forget the configuration, e.g. after a hardware reset. `init` must run again.
    pub fn invalidate(&mut self) {
        self.initialized = false;
    }

    /// Whether `init` ran since construction or the last reset.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Highest addressable LED index.
    #[must_use]
    pub const fn last_index(&self) -> u8 {
        self.last_index
    }

    /// Number of addressable LEDs (`last_index + 1`).
    #[must_use]
    pub const fn led_count(&self) -> u16 {
        self.last_index as u16 + 1
    }

    /// How long `show` waits for the booster to push a frame out (microseconds).
    #[must_use]
    pub const fn show_delay_us(&self) -> u32 {
        LED_DELAY_US * self.led_count() as u32
    }

    // ========================================================================
    // Color staging
    // ========================================================================

    /// `SETRGB`.
    #[must_use]
    pub fn set_rgb(&self, color: RGB8) -> Packet {
        self.check_initialized();
        Packet::set_rgb(color)
    }

    /// `SETRGBW`.
    #[must_use]
    pub fn set_rgbw(&self, color: RGB8, white: u8) -> Packet {
        self.check_initialized();
        Packet::set_rgbw(color, white)
    }

    /// `SETHSV` with the hue clamped to 359.
    #[must_use]
    pub fn set_hsv(&self, hue: u16, saturation: u8, value: u8) -> Packet {
        self.check_initialized();
        Packet::set_hsv(hue, saturation, value)
    }

    // ========================================================================
    // Addressing
    // ========================================================================

    /// `SETLED`, or `None` if `index` is past the strip.
    #[must_use]
    pub fn set_led(&self, index: u8) -> Option<Packet> {
        self.index_in_range(index).then(|| Packet::set_led(index))
    }

    /// Fused black `SETRGB` + `SETLED`, or `None` if `index` is past the strip.
    #[must_use]
    pub fn clear_led(&self, index: u8) -> Option<Packet> {
        self.index_in_range(index).then(|| Packet::clear_led(index))
    }

    /// `SETALL`. Always sent.
    #[must_use]
    pub fn set_all(&self) -> Packet {
        self.check_initialized();
        Packet::set_all()
    }

    /// Fused black `SETRGB` + `SETALL`. Always sent.
    #[must_use]
    pub fn clear_all(&self) -> Packet {
        self.check_initialized();
        Packet::clear_all()
    }

    /// `SETRANGE`, or `None` for an invalid range.
    #[must_use]
    pub fn set_range(&self, start: u8, end: u8) -> Option<Packet> {
        self.range_in_bounds(start, end)
            .then(|| Packet::set_range(start, end))
    }

    /// `SETRAINBOW` with the hue clamped to 359, or `None` for an invalid range.
    #[must_use]
    pub fn set_rainbow(
        &self,
        hue: u16,
        saturation: u8,
        value: u8,
        start: u8,
        end: u8,
        step: u8,
    ) -> Option<Packet> {
        self.range_in_bounds(start, end)
            .then(|| Packet::set_rainbow(hue, saturation, value, start, end, step))
    }

    /// Gradient packets over the visible part of `start..=end`.
    ///
    /// `None` when `start > end` or `start` is past the strip. A zero-width
    /// gradient yields a single `SETRGB` with `from`.
    #[must_use]
    pub fn gradient(&self, start: i32, end: i32, from: RGB8, to: RGB8) -> Option<Gradient> {
        self.check_initialized();
        let gradient = Gradient::new(start, end, from, to, self.last_index);
        if gradient.is_none() {
            trace!("gradient {}..={} skipped", start, end);
        }
        gradient
    }

    /// Shift-up command, or `None` for an invalid range.
    ///
    /// The opcode follows the configured [`ShiftUpOpcode`].
    #[must_use]
    pub fn shift_up(&self, start: u8, end: u8, count: u8) -> Option<Packet> {
        self.range_in_bounds(start, end)
            .then(|| Packet::shift(self.shift_up_opcode.opcode(), start, end, count))
    }

    /// `SHIFTDOWN`, or `None` for an invalid range.
    #[must_use]
    pub fn shift_down(&self, start: u8, end: u8, count: u8) -> Option<Packet> {
        self.range_in_bounds(start, end)
            .then(|| Packet::shift(Opcode::ShiftDown, start, end, count))
    }

    /// `COPYLED`, or `None` if either index is past the strip.
    #[must_use]
    pub fn copy_led(&self, from: u8, to: u8) -> Option<Packet> {
        (self.index_in_range(from) && self.index_in_range(to))
            .then(|| Packet::copy_led(from, to))
    }

    /// `REPEAT`, or `None` for an invalid range.
    #[must_use]
    pub fn repeat(&self, start: u8, end: u8, count: u8) -> Option<Packet> {
        self.range_in_bounds(start, end)
            .then(|| Packet::repeat(start, end, count))
    }

    /// `SHOW`.
    #[must_use]
    pub fn show(&self) -> Packet {
        self.check_initialized();
        Packet::show()
    }

    // ========================================================================
    // Bounds policy
    // ========================================================================

    fn index_in_range(&self, index: u8) -> bool {
        self.check_initialized();
        let in_range = index <= self.last_index;
        if !in_range {
            trace!("index {} past last index {}, skipped", index, self.last_index);
        }
        in_range
    }

    fn range_in_bounds(&self, start: u8, end: u8) -> bool {
        self.check_initialized();
        let in_bounds = start <= end && end <= self.last_index;
        if !in_bounds {
            trace!(
                "range {}..={} outside 0..={}, skipped",
                start,
                end,
                self.last_index
            );
        }
        in_bounds
    }

    fn check_initialized(&self) {
        if !self.initialized {
            warn!("booster command before init; the firmware will ignore it");
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
