//! Async version of the booster device abstraction.
//!
//! Same operations and wire format as [`Booster`](crate::Booster), over
//! `embedded-hal-async` SPI and delay. Chip select and reset stay plain
//! [`OutputPin`]s.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiBus;
use smart_leds::RGB8;

use crate::booster::NoResetPin;
use crate::command::Packet;
use crate::config::{BoosterConfig, COMMAND_DELAY_US, INIT_DELAY_MS, RESET_PULSE_MS};
use crate::error::{Error, Result};
use crate::session::Session;

/// A device abstraction for the Digi-Dot-Booster, async version.
///
/// The settle delays are awaited instead of spun, so other tasks run while the
/// booster digests a command or pushes a frame out.
///
/// # Example
///
/// ```no_run
/// use dd_booster::{BoosterAsync, BoosterConfig, Result, colors};
/// use embedded_hal::digital::OutputPin;
/// use embedded_hal_async::{delay::DelayNs, spi::SpiBus};
///
/// async fn example<SPI, CS, D>(spi: SPI, cs: CS, delay: D) -> Result<(), SPI::Error>
/// where
///     SPI: SpiBus,
///     CS: OutputPin,
///     D: DelayNs,
/// {
///     let mut booster = BoosterAsync::new(spi, cs, delay);
///     booster.init(&BoosterConfig::new(8)).await?;
///     booster.set_rgb(colors::YELLOW).await?;
///     booster.set_all().await?;
///     booster.show().await
/// }
/// ```
pub struct BoosterAsync<SPI, CS, RST, D> {
    spi: SPI,
    cs: CS,
    reset: Option<RST>,
    delay: D,
    session: Session,
}

impl<SPI, CS, D> BoosterAsync<SPI, CS, NoResetPin, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    /// Create a booster without a reset line. [`reset`](Self::reset) does nothing.
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

impl<SPI, CS, RST, D> BoosterAsync<SPI, CS, RST, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Create a booster whose active-low reset line is wired to `reset`.
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

    /// See [`Booster::init`](crate::Booster::init).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn init(&mut self, config: &BoosterConfig) -> Result<(), SPI::Error> {
        info!(
            "booster init: {} LEDs ({} on the wire)",
            config.effective_led_count(),
            config.wire_led_count()
        );
        let packets = self.session.init(config);
        for packet in packets.iter() {
            self.send_raw_bytes(packet.as_bytes()).await?;
        }
        self.delay.delay_ms(INIT_DELAY_MS).await;
        Ok(())
    }

    /// See [`Booster::reset`](crate::Booster::reset).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResetLine`] if the reset pin fails.
    pub async fn reset(&mut self) -> Result<(), SPI::Error> {
        let Some(reset) = self.reset.as_mut() else {
            debug!("booster reset: no reset line, skipped");
            return Ok(());
        };
        info!("booster reset");
        reset.set_low().map_err(|_| Error::ResetLine)?;
        self.delay.delay_ms(RESET_PULSE_MS).await;
        reset.set_high().map_err(|_| Error::ResetLine)?;
        self.delay.delay_ms(RESET_PULSE_MS).await;
        self.session.invalidate();
        Ok(())
    }

    /// See [`Booster::set_rgb`](crate::Booster::set_rgb).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn set_rgb(&mut self, color: RGB8) -> Result<(), SPI::Error> {
        let packet = self.session.set_rgb(color);
        self.send_raw_bytes(packet.as_bytes()).await
    }

    /// See [`Booster::set_rgbw`](crate::Booster::set_rgbw).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn set_rgbw(&mut self, color: RGB8, white: u8) -> Result<(), SPI::Error> {
        let packet = self.session.set_rgbw(color, white);
        self.send_raw_bytes(packet.as_bytes()).await
    }

    /// See [`Booster::set_hsv`](crate::Booster::set_hsv).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn set_hsv(&mut self, hue: u16, saturation: u8, value: u8) -> Result<(), SPI::Error> {
        let packet = self.session.set_hsv(hue, saturation, value);
        self.send_raw_bytes(packet.as_bytes()).await
    }

    /// See [`Booster::set_led`](crate::Booster::set_led).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn set_led(&mut self, index: u8) -> Result<(), SPI::Error> {
        let packet = self.session.set_led(index);
        self.send_packet(packet).await
    }

    /// See [`Booster::clear_led`](crate::Booster::clear_led).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn clear_led(&mut self, index: u8) -> Result<(), SPI::Error> {
        let packet = self.session.clear_led(index);
        self.send_packet(packet).await
    }

    /// See [`Booster::set_all`](crate::Booster::set_all).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn set_all(&mut self) -> Result<(), SPI::Error> {
        let packet = self.session.set_all();
        self.send_raw_bytes(packet.as_bytes()).await
    }

    /// See [`Booster::clear_all`](crate::Booster::clear_all).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn clear_all(&mut self) -> Result<(), SPI::Error> {
        let packet = self.session.clear_all();
        self.send_raw_bytes(packet.as_bytes()).await
    }

    /// See [`Booster::set_range`](crate::Booster::set_range).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn set_range(&mut self, start: u8, end: u8) -> Result<(), SPI::Error> {
        let packet = self.session.set_range(start, end);
        self.send_packet(packet).await
    }

    /// See [`Booster::set_rainbow`](crate::Booster::set_rainbow).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn set_rainbow(
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
        self.send_packet(packet).await
    }

    /// See [`Booster::set_gradient`](crate::Booster::set_gradient).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn set_gradient(
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
            self.send_raw_bytes(packet.as_bytes()).await?;
        }
        Ok(())
    }

    /// See [`Booster::shift_up`](crate::Booster::shift_up).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn shift_up(&mut self, start: u8, end: u8, count: u8) -> Result<(), SPI::Error> {
        let packet = self.session.shift_up(start, end, count);
        self.send_packet(packet).await
    }

    /// See [`Booster::shift_down`](crate::Booster::shift_down).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn shift_down(&mut self, start: u8, end: u8, count: u8) -> Result<(), SPI::Error> {
        let packet = self.session.shift_down(start, end, count);
        self.send_packet(packet).await
    }

    /// See [`Booster::copy_led`](crate::Booster::copy_led).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn copy_led(&mut self, from: u8, to: u8) -> Result<(), SPI::Error> {
        let packet = self.session.copy_led(from, to);
        self.send_packet(packet).await
    }

    /// See [`Booster::repeat`](crate::Booster::repeat).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn repeat(&mut self, start: u8, end: u8, count: u8) -> Result<(), SPI::Error> {
        let packet = self.session.repeat(start, end, count);
        self.send_packet(packet).await
    }

    /// See [`Booster::show`](crate::Booster::show).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip-select pin fails.
    pub async fn show(&mut self) -> Result<(), SPI::Error> {
        let packet = self.session.show();
        self.send_raw_bytes(packet.as_bytes()).await?;
        self.delay.delay_us(self.session.show_delay_us()).await;
        Ok(())
    }

    /// See [`Booster::send_raw_bytes`](crate::Booster::send_raw_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if the write fails (chip select is still released)
    /// and [`Error::ChipSelect`] if the pin fails.
    pub async fn send_raw_bytes(&mut self, bytes: &[u8]) -> Result<(), SPI::Error> {
        self.cs.set_low().map_err(|_| Error::ChipSelect)?;
        let written = match self.spi.write(bytes).await {
            Ok(()) => self.spi.flush().await,
            Err(error) => Err(error),
        };
        let released = self.cs.set_high().map_err(|_| Error::ChipSelect);
        written.map_err(Error::Spi)?;
        released?;
        self.delay.delay_us(COMMAND_DELAY_US).await;
        Ok(())
    }

    async fn send_packet(&mut self, packet: Option<Packet>) -> Result<(), SPI::Error> {
        match packet {
            Some(packet) => self.send_raw_bytes(packet.as_bytes()).await,
            None => Ok(()),
        }
    }
}
