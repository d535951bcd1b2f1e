//! A device abstraction for the Digi-Dot-Booster LED strip controller.
//!
//! See [`Booster`] for usage examples and [`BoosterAsync`](crate::BoosterAsync)
//! for the async version.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::spi::SpiBus;
use smart_leds::RGB8;

use crate::command::Packet;
use crate::config::{BoosterConfig, COMMAND_DELAY_US, INIT_DELAY_MS, RESET_PULSE_MS};
use crate::error::{Error, Result};
use crate::session::Session;

/// Placeholder type for a booster wired without a reset line.
///
/// It has no values, so the reset slot of a [`Booster`] built with
/// [`Booster::new`] is always `None`.
#[derive(Debug)]
pub enum NoResetPin {}

impl PinErrorType for NoResetPin {
    type Error = Infallible;
}

impl OutputPin for NoResetPin {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        match *self {}
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        match *self {}
    }
}

/// A device abstraction for the Digi-Dot-Booster, blocking version.
///
/// The booster sits between the host and a WS2812/SK6812 strip. Color
/// operations stage a color inside the booster, addressing operations apply it
/// to LEDs, and [`show`](Self::show) pushes the frame out to the strip.
///
/// Each operation is one chip-select-guarded transaction followed by a 500 µs
/// settle delay. Out-of-range indices and ranges are skipped without any bus
/// traffic; only transport failures are reported.
///
/// The SPI bus must be set up with [`SPI_MODE`](crate::SPI_MODE) at
/// [`SPI_FREQUENCY_HZ`](crate::SPI_FREQUENCY_HZ), and the chip-select pin
/// should start high.
///
/// # Example
///
/// ```no_run
/// use dd_booster::{Booster, BoosterConfig, ColorOrder, Result, colors};
/// use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};
///
/// fn example<SPI, CS, D>(spi: SPI, cs: CS, delay: D) -> Result<(), SPI::Error>
/// where
///     SPI: SpiBus,
///     CS: OutputPin,
///     D: DelayNs,
/// {
///     let mut booster = Booster::new(spi, cs, delay);
///     booster.init(&BoosterConfig::new(60).with_color_order(ColorOrder::Rgb))?;
///
///     booster.clear_all()?;
///     booster.set_rgb(colors::BLUE)?;
///     booster.set_range(0, 9)?;
///     booster.set_gradient(-5, 30, colors::RED, colors::GREEN)?;
///     booster.show()?;
///     Ok(())
/// }
/// ```
pub struct Booster<SPI, CS, RST, D> {
    spi: SPI,
    cs: CS,
    reset: Option<RST>,
    delay: D,
    session: Session,
}

impl<SPI, CS, D> Booster<SPI, CS, NoResetPin, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    /// Create a booster without a reset line. [`reset`](Self::reset) does nothing.
    ///
    /// No bus traffic happens until [`init`](Self::init).
    pub const fn new(spi: SPI, cs: CS, delay: D) -> Self {
        Self {
            spi,
            cs,
            reset: None,
            delay,
            session: Session::new(),
        }
    }
}

impl<SPI, CS, RST, D> Booster<SPI, CS, RST, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Create a booster whose active-low reset line is wired to `reset`.
    ///
    /// No bus traffic happens until [`init`](Self::init).
    pub const fn new_with_reset(spi: SPI, cs: CS, reset: RST, delay: D) -> Self {
        Self {
            spi,
            cs,
            reset: Some(reset),
            delay,
            session: Session::new(),
        }
    }

    /// Give back the bus, pins and delay.
    pub fn release(self) -> (SPI, CS, Option<RST>, D) {
        (self.spi, self.cs, self.reset, self.delay)
    }

    /// The session state: last index, LED count, whether `init` ran.
    pub const fn session(&self) -> &Session {
        &self.session
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Configure LED count, type and color order, then wait 40 ms for the booster to settle.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn init(&mut self, config: &BoosterConfig) -> Result<(), SPI::Error> {
        info!(
            "booster init: {} LEDs ({} on the wire)",
            config.effective_led_count(),
            config.wire_led_count()
        );
        let packets = self.session.init(config);
        for packet in packets.iter() {
            self.send_raw_bytes(packet.as_bytes())?;
        }
        self.delay.delay_ms(INIT_DELAY_MS);
        Ok(())
    }

    /// Pulse the reset line low for 100 ms, then high for 100 ms.
    ///
    /// Does nothing without a reset line. Afterwards the booster has forgotten
    /// its configuration: call [`init`](Self::init) again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResetLine`] if the reset pin fails.
    pub fn reset(&mut self) -> Result<(), SPI::Error> {
        let Some(reset) = self.reset.as_mut() else {
            debug!("booster reset: no reset line, skipped");
            return Ok(());
        };
        info!("booster reset");
        reset.set_low().map_err(|_| Error::ResetLine)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        reset.set_high().map_err(|_| Error::ResetLine)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        self.session.invalidate();
        Ok(())
    }

    // ========================================================================
    // Color staging
    // ========================================================================

    /// Stage an RGB color for the following addressing operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn set_rgb(&mut self, color: RGB8) -> Result<(), SPI::Error> {
        let packet = self.session.set_rgb(color);
        self.send_raw_bytes(packet.as_bytes())
    }

    /// Stage an RGBW color for the following addressing operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn set_rgbw(&mut self, color: RGB8, white: u8) -> Result<(), SPI::Error> {
        let packet = self.session.set_rgbw(color, white);
        self.send_raw_bytes(packet.as_bytes())
    }

    /// Stage an HSV color. `hue` above 359 is clamped to 359.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn set_hsv(&mut self, hue: u16, saturation: u8, value: u8) -> Result<(), SPI::Error> {
        let packet = self.session.set_hsv(hue, saturation, value);
        self.send_raw_bytes(packet.as_bytes())
    }

    // ========================================================================
    // Addressing
    // ========================================================================

    /// Apply the staged color to one LED. Skipped if `index` is past the strip.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn set_led(&mut self, index: u8) -> Result<(), SPI::Error> {
        let packet = self.session.set_led(index);
        self.send_packet(packet)
    }

    /// Turn one LED off. Skipped if `index` is past the strip.
    ///
    /// Stages black, so the previously staged color is lost.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn clear_led(&mut self, index: u8) -> Result<(), SPI::Error> {
        let packet = self.session.clear_led(index);
        self.send_packet(packet)
    }

    /// Apply the staged color to every LED.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn set_all(&mut self) -> Result<(), SPI::Error> {
        let packet = self.session.set_all();
        self.send_raw_bytes(packet.as_bytes())
    }

    /// Turn every LED off. Stages black.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn clear_all(&mut self) -> Result<(), SPI::Error> {
        let packet = self.session.clear_all();
        self.send_raw_bytes(packet.as_bytes())
    }

    /// Apply the staged color to `start..=end`.
    ///
    /// Skipped if `start > end` or `end` is past the strip.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn set_range(&mut self, start: u8, end: u8) -> Result<(), SPI::Error> {
        let packet = self.session.set_range(start, end);
        self.send_packet(packet)
    }

    /// Paint a rainbow over `start..=end`, starting at `hue` and advancing `step` per LED.
    ///
    /// Skipped if `start > end` or `end` is past the strip. `hue` above 359 is clamped.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn set_rainbow(
        &mut self,
        hue: u16,
        saturation: u8,
        value: u8,
        start: u8,
        end: u8,
        step: u8,
    ) -> Result<(), SPI::Error> {
        let packet = self
            .session
            .set_rainbow(hue, saturation, value, start, end, step);
        self.send_packet(packet)
    }

    /// Paint a gradient from `from` at `start` to `to` at `end`.
    ///
    /// Either end may lie off the strip; only LEDs in `0..=last_index` are
    /// sent, one transaction each. Skipped if `start > end` or `start` is past
    /// the strip. When `start == end` only `from` is staged.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails. LEDs sent before the failure keep their color.
    pub fn set_gradient(
        &mut self,
        start: i32,
        end: i32,
        from: RGB8,
        to: RGB8,
    ) -> Result<(), SPI::Error> {
        let Some(gradient) = self.session.gradient(start, end, from, to) else {
            return Ok(());
        };
        for packet in gradient {
            self.send_raw_bytes(packet.as_bytes())?;
        }
        Ok(())
    }

    /// Shift the colors in `start..=end` up by `count`.
    ///
    /// Sends the opcode chosen by [`ShiftUpOpcode`](crate::ShiftUpOpcode);
    /// by default that is the same opcode as [`shift_down`](Self::shift_down).
    /// Skipped for an invalid range.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn shift_up(&mut self, start: u8, end: u8, count: u8) -> Result<(), SPI::Error> {
        let packet = self.session.shift_up(start, end, count);
        self.send_packet(packet)
    }

    /// Shift the colors in `start..=end` down by `count`. Skipped for an invalid range.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn shift_down(&mut self, start: u8, end: u8, count: u8) -> Result<(), SPI::Error> {
        let packet = self.session.shift_down(start, end, count);
        self.send_packet(packet)
    }

    /// Copy the color of LED `from` to LED `to`. Skipped if either is past the strip.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn copy_led(&mut self, from: u8, to: u8) -> Result<(), SPI::Error> {
        let packet = self.session.copy_led(from, to);
        self.send_packet(packet)
    }

    /// Copy `start..=end` `count` times right after itself. Skipped for an invalid range.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn repeat(&mut self, start: u8, end: u8, count: u8) -> Result<(), SPI::Error> {
        let packet = self.session.repeat(start, end, count);
        self.send_packet(packet)
    }

    // ========================================================================
    // Frame commit
    // ========================================================================

    /// Push the frame to the LEDs and wait 30 µs per LED while the booster sends it.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub fn show(&mut self) -> Result<(), SPI::Error> {
        let packet = self.session.show();
        self.send_raw_bytes(packet.as_bytes())?;
        self.delay.delay_us(self.session.show_delay_us());
        Ok(())
    }

    // ========================================================================
    // Transaction primitive
    // ========================================================================

    /// Send `bytes` as one transaction: chip select low, bytes in order, chip
    /// select high, then the 500 µs settle delay.
    ///
    /// Every other operation goes through here. No validation is applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if the write fails (chip select is still released)
    /// and [`Error::ChipSelect`] if the pin fails.
    pub fn send_raw_bytes(&mut self, bytes: &[u8]) -> Result<(), SPI::Error> {
        self.cs.set_low().map_err(|_| Error::ChipSelect)?;
        let written = self
            .spi
            .write(bytes)
            .and_then(|()| self.spi.flush())
            .map_err(Error::Spi);
        let released = self.cs.set_high().map_err(|_| Error::ChipSelect);
        written?;
        released?;
        self.delay.delay_us(COMMAND_DELAY_US);
        Ok(())
    }

    fn send_packet(&mut self, packet: Option<Packet>) -> Result<(), SPI::Error> {
        match packet {
            Some(packet) => self.send_raw_bytes(packet.as_bytes()),
            None => Ok(()),
        }
    }
}
