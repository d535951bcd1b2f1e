//! Booster wire format.
//!
//! Every command is an opcode byte followed by a fixed number of operand bytes.
//! Several commands may be fused into one [`Packet`] so they travel in a single
//! chip-select transaction.

use smart_leds::RGB8;

/// Largest hue the booster accepts. Larger values are clamped, not wrapped.
pub const HUE_MAX: u16 = 359;

/// Capacity of a [`Packet`]. The longest single command (`SETRAINBOW`) is 8 bytes.
pub const PACKET_CAPACITY: usize = 8;

// ============================================================================
// Opcodes
// ============================================================================

/// Command opcodes understood by the booster firmware.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    /// Stage an RGB color: `r, g, b`.
    SetRgb = 0xA1,
    /// Stage an RGBW color: `r, g, b, w`.
    SetRgbw = 0xA2,
    /// Stage an HSV color: `hue_low, hue_high, s, v`.
    SetHsv = 0xA3,
    /// Apply the staged color to one LED: `index`.
    SetLed = 0xA4,
    /// Apply the staged color to every LED.
    SetAll = 0xA5,
    /// Apply the staged color to a range: `start, end`.
    SetRange = 0xA6,
    /// Rainbow over a range: `hue_low, hue_high, s, v, start, end, step`.
    SetRainbow = 0xA7,
    /// Reserved. Gradients are computed on the host.
    Gradient = 0xA8,
    /// Configure the strip: `count, led_type`.
    Init = 0xB1,
    /// Push the frame out to the LEDs.
    Show = 0xB2,
    /// Reserved shift-up opcode. See [`ShiftUpOpcode`](crate::ShiftUpOpcode).
    ShiftUp = 0xB3,
    /// Shift a range: `start, end, count`.
    ShiftDown = 0xB4,
    /// Copy one LED to another: `from, to`.
    CopyLed = 0xB5,
    /// Repeat a range after itself: `start, end, count`.
    Repeat = 0xB6,
    /// Reorder color channels: `3, 2, 1`.
    RgbOrder = 0xC1,
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        opcode as Self
    }
}

// ============================================================================
// LED type and color order
// ============================================================================

/// Bits per LED, fixed when the booster is initialized.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedType {
    /// Three channels, 24 bits (WS2812 and friends). The booster's default.
    #[default]
    Rgb,
    /// Four channels, 32 bits (SK6812 RGBW).
    Rgbw,
}

impl LedType {
    /// The `INIT` operand: number of bits per LED.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Rgb => 24,
            Self::Rgbw => 32,
        }
    }
}

/// Channel order of RGB LEDs.
///
/// GRB is what WS2812 LEDs use and what the booster assumes after `INIT`.
/// Only meaningful for [`LedType::Rgb`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    /// Red, green, blue.
    Rgb,
    /// Green, red, blue.
    #[default]
    Grb,
}

/// Clamp a hue to `0..=359`.
#[must_use]
pub const fn clamp_hue(hue: u16) -> u16 {
    if hue > HUE_MAX { HUE_MAX } else { hue }
}

// ============================================================================
// Packet
// ============================================================================

/// One transaction's worth of bytes: one command, or several fused together.
///
/// Fixed capacity, built on the stack per call.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Packet {
    bytes: [u8; PACKET_CAPACITY],
    len: u8,
}

impl Packet {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "N is asserted to be at most PACKET_CAPACITY"
    )]
    const fn from_array<const N: usize>(array: [u8; N]) -> Self {
        assert!(N <= PACKET_CAPACITY, "command does not fit in a packet");
        let mut bytes = [0; PACKET_CAPACITY];
        let mut index = 0;
        while index < N {
            bytes[index] = array[index];
            index += 1;
        }
        Self {
            bytes,
            len: N as u8,
        }
    }

    /// The encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Number of encoded bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// A packet is never empty once built; provided for completeness with [`len`](Self::len).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `INIT`. `count` is the already rounded wire count (256 encodes as 0).
    #[must_use]
    pub const fn init(count: u8, led_type: LedType) -> Self {
        Self::from_array([Opcode::Init as u8, count, led_type.code()])
    }

    /// `RGBORDER 3, 2, 1`: reinterpret RGB input for GRB LEDs.
    #[must_use]
    pub const fn rgb_order() -> Self {
        Self::from_array([Opcode::RgbOrder as u8, 3, 2, 1])
    }

    /// `SETRGB r, g, b`.
    #[must_use]
    pub const fn set_rgb(color: RGB8) -> Self {
        Self::from_array([Opcode::SetRgb as u8, color.r, color.g, color.b])
    }

    /// `SETRGBW r, g, b, w`.
    #[must_use]
    pub const fn set_rgbw(color: RGB8, white: u8) -> Self {
        Self::from_array([Opcode::SetRgbw as u8, color.r, color.g, color.b, white])
    }

    /// `SETHSV`. The hue is clamped to 359 and sent little-endian.
    #[must_use]
    pub const fn set_hsv(hue: u16, saturation: u8, value: u8) -> Self {
        let [hue_low, hue_high] = clamp_hue(hue).to_le_bytes();
        Self::from_array([Opcode::SetHsv as u8, hue_low, hue_high, saturation, value])
    }

    /// `SETLED index`.
    #[must_use]
    pub const fn set_led(index: u8) -> Self {
        Self::from_array([Opcode::SetLed as u8, index])
    }

    /// `SETRGB color` fused with `SETLED index`.
    #[must_use]
    pub const fn set_rgb_led(color: RGB8, index: u8) -> Self {
        Self::from_array([
            Opcode::SetRgb as u8,
            color.r,
            color.g,
            color.b,
            Opcode::SetLed as u8,
            index,
        ])
    }

    /// `SETRGB 0, 0, 0` fused with `SETLED index`.
    #[must_use]
    pub const fn clear_led(index: u8) -> Self {
        Self::set_rgb_led(RGB8::new(0, 0, 0), index)
    }

    /// `SETALL`.
    #[must_use]
    pub const fn set_all() -> Self {
        Self::from_array([Opcode::SetAll as u8])
    }

    /// `SETRGB 0, 0, 0` fused with `SETALL`.
    #[must_use]
    pub const fn clear_all() -> Self {
        Self::from_array([Opcode::SetRgb as u8, 0, 0, 0, Opcode::SetAll as u8])
    }

    /// `SETRANGE start, end`.
    #[must_use]
    pub const fn set_range(start: u8, end: u8) -> Self {
        Self::from_array([Opcode::SetRange as u8, start, end])
    }

    /// `SETRAINBOW`. The hue is clamped to 359 and sent little-endian.
    #[must_use]
    pub const fn set_rainbow(
        hue: u16,
        saturation: u8,
        value: u8,
        start: u8,
        end: u8,
        step: u8,
    ) -> Self {
        let [hue_low, hue_high] = clamp_hue(hue).to_le_bytes();
        Self::from_array([
            Opcode::SetRainbow as u8,
            hue_low,
            hue_high,
            saturation,
            value,
            start,
            end,
            step,
        ])
    }

    /// A shift command with an explicit opcode: `opcode, start, end, count`.
    #[must_use]
    pub const fn shift(opcode: Opcode, start: u8, end: u8, count: u8) -> Self {
        Self::from_array([opcode as u8, start, end, count])
    }

    /// `COPYLED from, to`.
    #[must_use]
    pub const fn copy_led(from: u8, to: u8) -> Self {
        Self::from_array([Opcode::CopyLed as u8, from, to])
    }

    /// `REPEAT start, end, count`.
    #[must_use]
    pub const fn repeat(start: u8, end: u8, count: u8) -> Self {
        Self::from_array([Opcode::Repeat as u8, start, end, count])
    }

    /// `SHOW`.
    #[must_use]
    pub const fn show() -> Self {
        Self::from_array([Opcode::Show as u8])
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl core::fmt::Debug for Packet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Packet").field(&self.as_bytes()).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Packet {
    fn format(&self, fmt: defmt::Formatter<'_>) {
        defmt::write!(fmt, "Packet({=[u8]:#x})", self.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_hue_is_clamped_and_little_endian() {
        assert_eq!(
            Packet::set_hsv(360, 255, 255).as_bytes(),
            &[0xA3, 103, 1, 255, 255]
        );
        assert_eq!(
            Packet::set_hsv(u16::MAX, 1, 2).as_bytes(),
            &[0xA3, 103, 1, 1, 2]
        );
        assert_eq!(Packet::set_hsv(300, 4, 5).as_bytes(), &[0xA3, 44, 1, 4, 5]);
    }

    #[test]
    fn fused_packets_keep_both_commands() {
        assert_eq!(Packet::clear_all().as_bytes(), &[0xA1, 0, 0, 0, 0xA5]);
        assert_eq!(
            Packet::clear_led(7).as_bytes(),
            &[0xA1, 0, 0, 0, 0xA4, 7]
        );
        assert_eq!(
            Packet::set_rgb_led(RGB8::new(1, 2, 3), 9).as_bytes(),
            &[0xA1, 1, 2, 3, 0xA4, 9]
        );
    }

    #[test]
    fn rainbow_fills_the_whole_packet() {
        let packet = Packet::set_rainbow(400, 10, 20, 1, 30, 5);
        assert_eq!(packet.len(), PACKET_CAPACITY);
        assert_eq!(packet.as_bytes(), &[0xA7, 103, 1, 10, 20, 1, 30, 5]);
    }

    #[test]
    fn led_type_codes_are_bits_per_led() {
        assert_eq!(Packet::init(10, LedType::Rgb).as_bytes(), &[0xB1, 10, 24]);
        assert_eq!(Packet::init(0, LedType::Rgbw).as_bytes(), &[0xB1, 0, 32]);
    }

    #[test]
    fn single_byte_commands() {
        assert_eq!(Packet::set_all().as_bytes(), &[0xA5]);
        assert_eq!(Packet::show().as_bytes(), &[0xB2]);
        assert!(!Packet::show().is_empty());
    }
}
