#![no_std]

//! Hardware contract of the TermOS kernel.
//!
//! The kernel never talks to peripherals directly. It goes through [`HalInterface`], using the
//! action enums of this crate. On target the trait is implemented by [`BoardHal`] on top of the
//! C board drivers; on the host, tests use [`mock::MockHal`].

#[cfg(any(test, feature = "mock"))]
extern crate std;

#[cfg(target_os = "none")]
mod bindings;
mod errors;
mod interface_read;
mod interface_write;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(target_os = "none")]
pub use bindings::BoardHal;
pub use errors::*;
pub use interface_read::*;
pub use interface_write::*;

/// Maximum number of bytes returned by one serial buffer read.
pub const K_BUFFER_SIZE: usize = 64;

/// Number of GPIO lines exposed by the board.
pub const K_GPIO_COUNT: u8 = 8;

/// Hardware interfaces the kernel opens at boot.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interface {
    PrimaryLink = 0,
    SecondaryLink = 1,
    Gpio = 2,
    CallbackTimer = 3,
    TickerTimer = 4,
    Switches = 5,
    SineOutput = 6,
}

impl Interface {
    pub fn name(&self) -> &'static str {
        match self {
            Interface::PrimaryLink => "SERIAL_MAIN",
            Interface::SecondaryLink => "SERIAL_AUX",
            Interface::Gpio => "GPIO",
            Interface::CallbackTimer => "CALLBACK_TIMER",
            Interface::TickerTimer => "TICKER_TIMER",
            Interface::Switches => "SWITCHES",
            Interface::SineOutput => "SINE_DAC",
        }
    }
}

/// Serial links carrying terminal traffic.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialLink {
    Primary = 0,
    Secondary = 1,
}

impl SerialLink {
    /// Returns the interface backing the link.
    pub fn interface(&self) -> Interface {
        match self {
            SerialLink::Primary => Interface::PrimaryLink,
            SerialLink::Secondary => Interface::SecondaryLink,
        }
    }

    pub fn name(&self) -> &'static str {
        self.interface().name()
    }
}

/// Hardware timers driven by the kernel.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerId {
    /// Clock of the TIMER callback slot, period set by the `-timer` command.
    Callback = 0,
    /// Shared clock of the tickers.
    Ticker = 1,
}

impl TimerId {
    pub fn interface(&self) -> Interface {
        match self {
            TimerId::Callback => Interface::CallbackTimer,
            TimerId::Ticker => Interface::TickerTimer,
        }
    }
}

/// Access to the board peripherals.
///
/// Implementations must not block: writes are queued by the driver, reads return what is
/// already available.
pub trait HalInterface {
    /// Opens (initializes) an interface.
    ///
    /// # Errors
    /// `HalError::InterfaceOpenFailed` when the peripheral cannot be brought up.
    fn open(&mut self, p_interface: Interface) -> HalResult<()>;

    /// Performs a write action.
    ///
    /// # Errors
    /// Propagates the driver failure (`WriteError`, `WrongPin`, `ReadOnlyInterface`, ...).
    fn write(&mut self, p_action: InterfaceWriteActions) -> HalResult<()>;

    /// Performs a read action.
    ///
    /// # Errors
    /// Propagates the driver failure (`ReadError`, `WrongPin`, ...).
    fn read(&mut self, p_action: InterfaceReadAction) -> HalResult<InterfaceReadResult>;
}
