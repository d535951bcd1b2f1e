//! Device configuration, bus parameters and protocol timing.
//!
//! See [`BoosterConfig`] for the settings passed to `init`.

use embedded_hal::spi::{MODE_0, Mode};

use crate::command::{ColorOrder, LedType, Opcode};

// ============================================================================
// Bus parameters
// ============================================================================

/// SPI mode the booster expects: clock idle low, sample on the leading edge.
///
/// `embedded-hal` buses are configured by the HAL that creates them; use this
/// together with [`SPI_FREQUENCY_HZ`] when setting up the bus. Words are 8 bits,
/// MSB first, and chip select is active low.
pub const SPI_MODE: Mode = MODE_0;

/// SPI clock frequency the booster expects (12 MHz).
pub const SPI_FREQUENCY_HZ: u32 = 12_000_000;

// ============================================================================
// Timing
// ============================================================================

/// Settle delay after every transaction (microseconds).
pub const COMMAND_DELAY_US: u32 = 500;

/// Settle delay after `init` (milliseconds). Not in the vendor documentation,
/// but the booster drops commands without it.
pub const INIT_DELAY_MS: u32 = 40;

/// Time the booster needs per LED to push a frame out (microseconds).
pub const LED_DELAY_US: u32 = 30;

/// Length of each half of the reset pulse (milliseconds).
pub const RESET_PULSE_MS: u32 = 100;

/// Largest number of LEDs one booster drives.
pub const MAX_LED_COUNT: u16 = 256;

// ============================================================================
// Shift-up opcode
// ============================================================================

/// Opcode sent by `shift_up`.
///
/// The vendor driver sends `SHIFTDOWN` (0xB4) for both shift directions and
/// never uses the reserved `SHIFTUP` opcode (0xB3). Which one the firmware
/// really expects has not been confirmed on hardware, so the default keeps the
/// observed behavior.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftUpOpcode {
    /// Send 0xB4 for `shift_up`, like the vendor driver.
    #[default]
    ShiftDown,
    /// Send the reserved 0xB3 for `shift_up`.
    ShiftUp,
}

impl ShiftUpOpcode {
    /// The opcode this policy puts on the wire for `shift_up`.
    #[must_use]
    pub const fn opcode(self) -> Opcode {
        match self {
            Self::ShiftDown => Opcode::ShiftDown,
            Self::ShiftUp => Opcode::ShiftUp,
        }
    }
}

// ============================================================================
// BoosterConfig
// ============================================================================

/// Default LED type ([`LedType::Rgb`]).
pub const LED_TYPE_DEFAULT: LedType = LedType::Rgb;

/// Default color order ([`ColorOrder::Grb`]).
pub const COLOR_ORDER_DEFAULT: ColorOrder = ColorOrder::Grb;

/// Settings sent to the booster by `init`.
///
/// # Example
///
/// ```
/// use dd_booster::{BoosterConfig, ColorOrder, LedType};
///
/// let config = BoosterConfig::new(60)
///     .with_led_type(LedType::Rgb)
///     .with_color_order(ColorOrder::Rgb);
/// assert_eq!(config.led_count, 60);
/// assert_eq!(config.effective_led_count(), 60);
/// assert_eq!(BoosterConfig::new(1000).effective_led_count(), 256);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoosterConfig {
    /// Number of LEDs on the strip. Clamped to `1..=256` by `init`.
    pub led_count: u16,
    /// Bits per LED.
    pub led_type: LedType,
    /// Channel order, only used with [`LedType::Rgb`].
    pub color_order: ColorOrder,
    /// Opcode used by `shift_up`.
    pub shift_up_opcode: ShiftUpOpcode,
}

impl BoosterConfig {
    /// A configuration for `led_count` WS2812-style LEDs (RGB, GRB order).
    #[must_use]
    pub const fn new(led_count: u16) -> Self {
        Self {
            led_count,
            led_type: LED_TYPE_DEFAULT,
            color_order: COLOR_ORDER_DEFAULT,
            shift_up_opcode: ShiftUpOpcode::ShiftDown,
        }
    }

    /// Set the LED type.
    #[must_use]
    pub const fn with_led_type(mut self, led_type: LedType) -> Self {
        self.led_type = led_type;
        self
    }

    /// Set the color order.
    #[must_use]
    pub const fn with_color_order(mut self, color_order: ColorOrder) -> Self {
        self.color_order = color_order;
        self
    }

    /// Set the opcode used by `shift_up`.
    #[must_use]
    pub const fn with_shift_up_opcode(mut self, shift_up_opcode: ShiftUpOpcode) -> Self {
        self.shift_up_opcode = shift_up_opcode;
        self
    }

    /// The LED count the session addresses: `led_count` clamped to `1..=256`.
    #[must_use]
    pub const fn effective_led_count(self) -> u16 {
        if self.led_count > MAX_LED_COUNT {
            MAX_LED_COUNT
        } else if self.led_count == 0 {
            1
        } else {
            self.led_count
        }
    }

    /// The count byte sent with `INIT`.
    ///
    /// The booster wants an even count, so odd counts round up, and 256 is sent as 0.
    #[must_use]
    pub const fn wire_led_count(self) -> u8 {
        let count = self.effective_led_count();
        let even = count + (count & 1);
        // 256 is the only value that does not fit and it wraps to 0.
        (even & 0xFF) as u8
    }

    /// Whether `init` also sends `RGBORDER`.
    #[must_use]
    pub const fn needs_rgb_order(self) -> bool {
        matches!(self.led_type, LedType::Rgb) && !matches!(self.color_order, ColorOrder::Grb)
    }
}

impl Default for BoosterConfig {
    fn default() -> Self {
        Self::new(MAX_LED_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_round_up_to_even_and_wrap_at_256() {
        assert_eq!(BoosterConfig::new(10).wire_led_count(), 10);
        assert_eq!(BoosterConfig::new(11).wire_led_count(), 12);
        assert_eq!(BoosterConfig::new(255).wire_led_count(), 0);
        assert_eq!(BoosterConfig::new(256).wire_led_count(), 0);
        assert_eq!(BoosterConfig::new(300).wire_led_count(), 0);
    }

    #[test]
    fn zero_leds_counts_as_one() {
        let config = BoosterConfig::new(0);
        assert_eq!(config.effective_led_count(), 1);
        assert_eq!(config.wire_led_count(), 2);
    }

    #[test]
    fn rgb_order_only_for_rgb_leds_in_rgb_order() {
        assert!(BoosterConfig::new(4).with_color_order(ColorOrder::Rgb).needs_rgb_order());
        assert!(!BoosterConfig::new(4).needs_rgb_order());
        assert!(
            !BoosterConfig::new(4)
                .with_led_type(LedType::Rgbw)
                .with_color_order(ColorOrder::Rgb)
                .needs_rgb_order()
        );
    }

    #[test]
    fn shift_up_defaults_to_the_observed_opcode() {
        assert_eq!(BoosterConfig::default().shift_up_opcode.opcode(), Opcode::ShiftDown);
        assert_eq!(ShiftUpOpcode::ShiftUp.opcode(), Opcode::ShiftUp);
    }
}
