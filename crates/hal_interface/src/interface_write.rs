use crate::InterfaceWriteActions::{GpioWrite, SineWrite, SwitchIrq, TimerWrite, UartWrite};
use crate::{SerialLink, TimerId};

/// High-level enum representing all possible write actions on any hardware interface.
#[derive(Debug, Clone, Copy)]
pub enum InterfaceWriteActions<'a> {
    /// Write action on a GPIO line.
    GpioWrite(u8, GpioWriteAction),
    /// Write action on a serial link.
    UartWrite(SerialLink, UartWriteActions<'a>),
    /// Start or stop a hardware timer.
    TimerWrite(TimerActions),
    /// Enable the interrupt of a switch (1 or 2).
    SwitchIrq(u8),
    /// Set the sine output frequency in Hz. 0 stops the output.
    SineWrite(u32),
}

impl InterfaceWriteActions<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            GpioWrite(..) => "GPIO Write",
            UartWrite(..) => "UART Write",
            TimerWrite(_) => "Timer Write",
            SwitchIrq(_) => "Switch IRQ",
            SineWrite(_) => "Sine Write",
        }
    }
}

/// Represents write operations specific to serial links.
#[derive(Debug, Clone, Copy)]
pub enum UartWriteActions<'a> {
    /// Send a string.
    SendString(&'a str),
    /// Send raw bytes.
    SendBytes(&'a [u8]),
}

impl<'a> UartWriteActions<'a> {
    /// Returns the bytes carried by the action.
    pub fn bytes(&self) -> &[u8] {
        match self {
            UartWriteActions::SendString(l_str) => l_str.as_bytes(),
            UartWriteActions::SendBytes(l_bytes) => l_bytes,
        }
    }
}

/// Represents possible actions on a GPIO pin.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioWriteAction {
    /// Set the pin to a high state.
    Set = 0,
    /// Set the pin to a low state.
    Clear = 1,
    /// Toggle the pin state.
    Toggle = 2,
}

/// Timer control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerActions {
    /// Start (or restart) the timer with the given period in milliseconds.
    Start(TimerId, u32),
    /// Stop the timer.
    Stop(TimerId),
}
