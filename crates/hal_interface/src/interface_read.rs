use crate::{K_BUFFER_SIZE, SerialLink};
use heapless::Vec;

#[derive(Debug, Clone, Copy)]
pub enum InterfaceReadAction {
    /// Read the level of a GPIO line.
    GpioRead(u8),
    /// Read one 32-bit word at the given (aligned) address.
    MemoryRead(u32),
    /// Drain the bytes received on a serial link since the last read.
    BufferRead(SerialLink),
}

impl InterfaceReadAction {
    pub fn name(&self) -> &'static str {
        match self {
            InterfaceReadAction::GpioRead(_) => "GPIO Read",
            InterfaceReadAction::MemoryRead(_) => "Memory Read",
            InterfaceReadAction::BufferRead(_) => "Buffer Read",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceReadResult {
    GpioLevel(bool),
    Word(u32),
    BufferRead(Vec<u8, K_BUFFER_SIZE>),
}
