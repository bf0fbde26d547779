//! Mock HAL implementation for testing
//!
//! Provides an in-memory [`HalInterface`] so that the kernel can be exercised on the host
//! without hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled

use crate::{
    GpioWriteAction, HalError, HalInterface, HalResult, Interface, InterfaceReadAction,
    InterfaceReadResult, InterfaceWriteActions, K_BUFFER_SIZE, K_GPIO_COUNT, SerialLink,
    TimerActions, TimerId,
};
use std::collections::{BTreeMap, VecDeque};
use std::string::String;
use std::vec::Vec;

/// Mock board
///
/// Records every write so tests can verify what the kernel did, and lets tests inject serial
/// input, GPIO input levels and memory contents.
///
/// # Example
///
/// ```
/// use hal_interface::mock::MockHal;
/// use hal_interface::{HalInterface, InterfaceWriteActions, SerialLink, UartWriteActions};
///
/// let mut hal = MockHal::new();
/// hal.write(InterfaceWriteActions::UartWrite(
///     SerialLink::Primary,
///     UartWriteActions::SendString("hello"),
/// ))
/// .unwrap();
/// assert_eq!(hal.output(SerialLink::Primary), "hello");
/// ```
#[derive(Debug, Default)]
pub struct MockHal {
    opened: Vec<Interface>,
    failing: Vec<Interface>,
    gpio: [bool; K_GPIO_COUNT as usize],
    toggles: [u32; K_GPIO_COUNT as usize],
    tx: [Vec<u8>; 2],
    tx_writes: [u32; 2],
    rx: [VecDeque<u8>; 2],
    timers: [Option<u32>; 2],
    timer_starts: [u32; 2],
    switch_irqs: [bool; 2],
    memory: BTreeMap<u32, u32>,
    sine_frequency: Option<u32>,
}

impl MockHal {
    /// Create a new mock board, all lines low, nothing opened.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `open` fail for the given interface.
    pub fn fail_on_open(&mut self, p_interface: Interface) {
        self.failing.push(p_interface);
    }

    /// Returns true when the interface was opened successfully.
    pub fn is_open(&self, p_interface: Interface) -> bool {
        self.opened.contains(&p_interface)
    }

    /// Everything written on a link so far (lossy UTF-8).
    pub fn output(&self, p_link: SerialLink) -> String {
        String::from_utf8_lossy(&self.tx[p_link as usize]).into_owned()
    }

    /// Raw bytes written on a link so far.
    pub fn output_bytes(&self, p_link: SerialLink) -> &[u8] {
        &self.tx[p_link as usize]
    }

    /// Number of write actions received by a link.
    pub fn uart_writes(&self, p_link: SerialLink) -> u32 {
        self.tx_writes[p_link as usize]
    }

    /// Clear the recorded output of a link.
    pub fn clear_output(&mut self, p_link: SerialLink) {
        self.tx[p_link as usize].clear();
    }

    /// Inject bytes to be returned by the next buffer reads of a link.
    pub fn inject_rx(&mut self, p_link: SerialLink, p_data: &[u8]) {
        self.rx[p_link as usize].extend(p_data.iter().copied());
    }

    /// Current level of a GPIO line.
    pub fn gpio_level(&self, p_pin: u8) -> bool {
        self.gpio[p_pin as usize]
    }

    /// Force the level of a GPIO line (for input lines such as the switches).
    pub fn set_gpio_level(&mut self, p_pin: u8, p_level: bool) {
        self.gpio[p_pin as usize] = p_level;
    }

    /// Number of toggle actions received by a GPIO line.
    pub fn toggle_count(&self, p_pin: u8) -> u32 {
        self.toggles[p_pin as usize]
    }

    /// Period of a running timer, `None` when stopped.
    pub fn timer_period(&self, p_timer: TimerId) -> Option<u32> {
        self.timers[p_timer as usize]
    }

    /// Number of start actions received by a timer.
    pub fn timer_starts(&self, p_timer: TimerId) -> u32 {
        self.timer_starts[p_timer as usize]
    }

    /// Returns true when the interrupt of switch 1 or 2 was enabled.
    pub fn switch_irq_enabled(&self, p_switch: u8) -> bool {
        p_switch >= 1 && self.switch_irqs[(p_switch - 1) as usize]
    }

    /// Store a word to be returned by memory reads.
    pub fn set_memory(&mut self, p_address: u32, p_value: u32) {
        self.memory.insert(p_address, p_value);
    }

    /// Last frequency written to the sine output.
    pub fn sine_frequency(&self) -> Option<u32> {
        self.sine_frequency
    }

    fn check_pin(p_pin: u8) -> HalResult<usize> {
        if p_pin < K_GPIO_COUNT {
            Ok(p_pin as usize)
        } else {
            Err(HalError::WrongPin(p_pin))
        }
    }
}

impl HalInterface for MockHal {
    fn open(&mut self, p_interface: Interface) -> HalResult<()> {
        if self.failing.contains(&p_interface) {
            return Err(HalError::InterfaceOpenFailed(p_interface.name()));
        }
        if !self.opened.contains(&p_interface) {
            self.opened.push(p_interface);
        }
        Ok(())
    }

    fn write(&mut self, p_action: InterfaceWriteActions) -> HalResult<()> {
        match p_action {
            InterfaceWriteActions::GpioWrite(l_pin, l_action) => {
                let l_idx = Self::check_pin(l_pin)?;
                match l_action {
                    GpioWriteAction::Set => self.gpio[l_idx] = true,
                    GpioWriteAction::Clear => self.gpio[l_idx] = false,
                    GpioWriteAction::Toggle => {
                        self.gpio[l_idx] = !self.gpio[l_idx];
                        self.toggles[l_idx] += 1;
                    }
                }
            }
            InterfaceWriteActions::UartWrite(l_link, l_data) => {
                self.tx[l_link as usize].extend_from_slice(l_data.bytes());
                self.tx_writes[l_link as usize] += 1;
            }
            InterfaceWriteActions::TimerWrite(TimerActions::Start(l_timer, l_period)) => {
                self.timers[l_timer as usize] = Some(l_period);
                self.timer_starts[l_timer as usize] += 1;
            }
            InterfaceWriteActions::TimerWrite(TimerActions::Stop(l_timer)) => {
                self.timers[l_timer as usize] = None;
            }
            InterfaceWriteActions::SwitchIrq(l_switch) => match l_switch {
                1 | 2 => self.switch_irqs[(l_switch - 1) as usize] = true,
                _ => return Err(HalError::IncompatibleAction("Switch IRQ", "SWITCHES")),
            },
            InterfaceWriteActions::SineWrite(l_freq) => self.sine_frequency = Some(l_freq),
        }
        Ok(())
    }

    fn read(&mut self, p_action: InterfaceReadAction) -> HalResult<InterfaceReadResult> {
        match p_action {
            InterfaceReadAction::GpioRead(l_pin) => {
                let l_idx = Self::check_pin(l_pin)?;
                Ok(InterfaceReadResult::GpioLevel(self.gpio[l_idx]))
            }
            InterfaceReadAction::MemoryRead(l_address) => Ok(InterfaceReadResult::Word(
                self.memory.get(&l_address).copied().unwrap_or(0),
            )),
            InterfaceReadAction::BufferRead(l_link) => {
                let mut l_data = heapless::Vec::<u8, K_BUFFER_SIZE>::new();
                let l_rx = &mut self.rx[l_link as usize];
                while !l_data.is_full() {
                    match l_rx.pop_front() {
                        Some(l_byte) => l_data.push(l_byte).unwrap_or(()),
                        None => break,
                    }
                }
                Ok(InterfaceReadResult::BufferRead(l_data))
            }
        }
    }
}
