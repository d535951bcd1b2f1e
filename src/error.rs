//! Errors surfaced by the booster drivers.
//!
//! Argument problems never show up here: out-of-range indices and ranges are
//! skipped silently and hue or LED count are clamped. Only transport failures
//! are reported.

use derive_more::{Display, Error as DeriveError};

/// Error returned by [`Booster`](crate::Booster) and [`BoosterAsync`](crate::BoosterAsync).
///
/// `SpiE` is the error type of the SPI bus the driver writes to.
#[derive(Debug, Display, DeriveError)]
pub enum Error<SpiE> {
    /// Writing or flushing the SPI bus failed.
    #[display("SPI bus error: {_0:?}")]
    Spi(#[error(not(source))] SpiE),
    /// Driving the chip-select line failed.
    #[display("chip select pin error")]
    ChipSelect,
    /// Driving the reset line failed.
    #[display("reset pin error")]
    ResetLine,
}

/// Result type for booster operations.
pub type Result<T, SpiE> = core::result::Result<T, Error<SpiE>>;
