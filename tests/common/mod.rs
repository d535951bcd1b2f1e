//! Recording fakes for the SPI bus, pins and delay.
//!
//! All fakes built from one [`Bus`] append to the same event log, so tests can
//! check byte order, chip-select bracketing and delays together.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, ErrorKind};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    Select,
    Deselect,
    Write(Vec<u8>),
    Flush,
    ResetLow,
    ResetHigh,
    DelayNs(u64),
}

#[derive(Clone, Default)]
pub struct Bus {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spi(&self) -> FakeSpi {
        FakeSpi {
            events: Rc::clone(&self.events),
            fail_writes: false,
        }
    }

    pub fn failing_spi(&self) -> FakeSpi {
        FakeSpi {
            events: Rc::clone(&self.events),
            fail_writes: true,
        }
    }

    pub fn cs(&self) -> FakePin {
        FakePin {
            events: Rc::clone(&self.events),
            role: PinRole::ChipSelect,
        }
    }

    pub fn reset(&self) -> FakePin {
        FakePin {
            events: Rc::clone(&self.events),
            role: PinRole::Reset,
        }
    }

    pub fn delay(&self) -> FakeDelay {
        FakeDelay {
            events: Rc::clone(&self.events),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Bytes written between each chip-select assertion and release.
    pub fn transactions(&self) -> Vec<Vec<u8>> {
        let mut transactions = Vec::new();
        let mut current: Option<Vec<u8>> = None;
        for event in self.events.borrow().iter() {
            match event {
                Event::Select => {
                    assert!(current.is_none(), "chip select asserted twice");
                    current = Some(Vec::new());
                }
                Event::Write(bytes) => current
                    .as_mut()
                    .expect("write outside a transaction")
                    .extend_from_slice(bytes),
                Event::Deselect => {
                    transactions.push(current.take().expect("release without select"));
                }
                _ => {}
            }
        }
        assert!(current.is_none(), "transaction left open");
        transactions
    }

    /// Sum of every recorded delay, in microseconds.
    pub fn total_delay_us(&self) -> u64 {
        self.events
            .borrow()
            .iter()
            .map(|event| match event {
                Event::DelayNs(ns) => *ns / 1_000,
                _ => 0,
            })
            .sum()
    }

    pub fn delays_us(&self) -> Vec<u64> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::DelayNs(ns) => Some(*ns / 1_000),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// SPI
// ============================================================================

pub struct FakeSpi {
    events: Rc<RefCell<Vec<Event>>>,
    fail_writes: bool,
}

impl FakeSpi {
    fn record_write(&mut self, words: &[u8]) -> Result<(), ErrorKind> {
        if self.fail_writes {
            return Err(ErrorKind::Other);
        }
        self.events.borrow_mut().push(Event::Write(words.to_vec()));
        Ok(())
    }

    fn record_flush(&mut self) {
        self.events.borrow_mut().push(Event::Flush);
    }
}

impl spi::ErrorType for FakeSpi {
    type Error = ErrorKind;
}

impl spi::SpiBus for FakeSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), ErrorKind> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), ErrorKind> {
        self.record_write(words)
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), ErrorKind> {
        read.fill(0);
        self.record_write(write)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), ErrorKind> {
        let written = words.to_vec();
        words.fill(0);
        self.record_write(&written)
    }

    fn flush(&mut self) -> Result<(), ErrorKind> {
        self.record_flush();
        Ok(())
    }
}

impl embedded_hal_async::spi::SpiBus for FakeSpi {
    async fn read(&mut self, words: &mut [u8]) -> Result<(), ErrorKind> {
        words.fill(0);
        Ok(())
    }

    async fn write(&mut self, words: &[u8]) -> Result<(), ErrorKind> {
        self.record_write(words)
    }

    async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), ErrorKind> {
        read.fill(0);
        self.record_write(write)
    }

    async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), ErrorKind> {
        let written = words.to_vec();
        words.fill(0);
        self.record_write(&written)
    }

    async fn flush(&mut self) -> Result<(), ErrorKind> {
        self.record_flush();
        Ok(())
    }
}

// ============================================================================
// Pins
// ============================================================================

#[derive(Clone, Copy, Debug)]
enum PinRole {
    ChipSelect,
    Reset,
}

pub struct FakePin {
    events: Rc<RefCell<Vec<Event>>>,
    role: PinRole,
}

impl digital::ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        let event = match self.role {
            PinRole::ChipSelect => Event::Select,
            PinRole::Reset => Event::ResetLow,
        };
        self.events.borrow_mut().push(event);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let event = match self.role {
            PinRole::ChipSelect => Event::Deselect,
            PinRole::Reset => Event::ResetHigh,
        };
        self.events.borrow_mut().push(event);
        Ok(())
    }
}

/// A pin whose every operation fails.
pub struct BrokenPin;

impl digital::ErrorType for BrokenPin {
    type Error = digital::ErrorKind;
}

impl OutputPin for BrokenPin {
    fn set_low(&mut self) -> Result<(), digital::ErrorKind> {
        Err(digital::ErrorKind::Other)
    }

    fn set_high(&mut self) -> Result<(), digital::ErrorKind> {
        Err(digital::ErrorKind::Other)
    }
}

// ============================================================================
// Delay
// ============================================================================

pub struct FakeDelay {
    events: Rc<RefCell<Vec<Event>>>,
}

impl FakeDelay {
    fn record(&mut self, ns: u64) {
        self.events.borrow_mut().push(Event::DelayNs(ns));
    }
}

impl embedded_hal::delay::DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.record(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.record(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.record(u64::from(ms) * 1_000_000);
    }
}

impl embedded_hal_async::delay::DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.record(u64::from(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.record(u64::from(us) * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.record(u64::from(ms) * 1_000_000);
    }
}
