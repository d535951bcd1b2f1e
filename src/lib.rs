//! Driver for the Digi-Dot-Booster, an SPI-attached controller for single-wire LED strips.
//!
//! The booster sits between the host and a WS2812/SK6812 strip and handles the
//! timing-critical LED protocol itself. The host only sends short commands over
//! SPI: stage a color, apply it to LEDs, shift or repeat ranges, then show the
//! frame. This crate encodes those commands and talks to the bus through
//! `embedded-hal` 1.0 ([`Booster`]) or `embedded-hal-async` ([`BoosterAsync`]).
//!
//! Bad arguments are never errors. Indices and ranges outside the strip skip the
//! command entirely; hue and LED count are clamped. Only bus and pin failures
//! are reported, through [`Error`].
//!
//! # Glossary
//!
//! - **Booster:** the controller chip that receives commands and drives the strip.
//! - **Transaction:** one chip-select-bracketed burst of bytes, possibly several
//!   commands fused together.
//! - **Settle delay:** the fixed 500 µs wait after each transaction.
//! - **Visible sub-range:** the part of a gradient that falls on the strip.
//!
//! # Features
//!
//! - `defmt`: log through `defmt` and derive `defmt::Format` for public types.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod booster;
pub mod booster_async;
pub mod command;
pub mod config;
mod error;
pub mod gradient;
pub mod session;

pub use crate::booster::{Booster, NoResetPin};
pub use crate::booster_async::BoosterAsync;
pub use crate::command::{ColorOrder, LedType, Opcode, Packet};
pub use crate::config::{BoosterConfig, SPI_FREQUENCY_HZ, SPI_MODE, ShiftUpOpcode};
pub use crate::error::{Error, Result};
pub use crate::gradient::Gradient;
pub use crate::session::{InitPackets, Session};

/// Predefined RGB color constants from the `smart_leds` crate.
#[doc(inline)]
pub use smart_leds::colors;

/// RGB color type used for staged colors and gradients.
pub use smart_leds::RGB8;
