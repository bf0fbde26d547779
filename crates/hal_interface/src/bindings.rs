use crate::HalError::{
    IncompatibleAction, InterfaceNotFound, InterfaceOpenFailed, ReadError, ReadOnlyInterface,
    WriteError, WrongPin,
};
use crate::{
    GpioWriteAction, HalError, HalInterface, HalResult, Interface, InterfaceReadAction,
    InterfaceReadResult, InterfaceWriteActions, K_BUFFER_SIZE, K_GPIO_COUNT, SerialLink,
    TimerActions, TimerId,
};
use heapless::Vec;

/// Represents the result codes returned by the C board drivers.
#[repr(u8)]
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalInterfaceResult {
    /// Operation successful.
    OK = 0,
    /// The specified interface was not found.
    ErrInterfaceNotFound = 1,
    /// The peripheral could not be initialized.
    ErrOpenFailed = 2,
    /// The GPIO line does not exist.
    ErrWrongPin = 3,
    /// Attempted to write to a read-only interface.
    ErrReadOnlyInterface = 4,
    /// The requested action is not compatible with the interface.
    ErrIncompatibleAction = 5,
    /// An error occurred during a write operation.
    ErrWriteError = 6,
    /// An error occurred during a read operation.
    ErrReadError = 7,
}

impl HalInterfaceResult {
    /// Converts a driver result code into a `HalResult<()>`.
    ///
    /// # Parameters
    /// - `p_interface`: interface the call was made on, used to name it in the error.
    /// - `p_action`: name of the action, used for `ErrIncompatibleAction`.
    /// - `p_pin`: GPIO line, used for `ErrWrongPin`.
    ///
    /// # Returns
    /// `Ok(())` for `OK`, the matching [`HalError`] otherwise.
    fn to_result(
        self,
        p_interface: Interface,
        p_action: &'static str,
        p_pin: u8,
    ) -> HalResult<()> {
        match self {
            HalInterfaceResult::OK => Ok(()),
            HalInterfaceResult::ErrInterfaceNotFound => Err(InterfaceNotFound(p_interface.name())),
            HalInterfaceResult::ErrOpenFailed => Err(InterfaceOpenFailed(p_interface.name())),
            HalInterfaceResult::ErrWrongPin => Err(WrongPin(p_pin)),
            HalInterfaceResult::ErrReadOnlyInterface => {
                Err(ReadOnlyInterface(p_interface.name()))
            }
            HalInterfaceResult::ErrIncompatibleAction => {
                Err(IncompatibleAction(p_action, p_interface.name()))
            }
            HalInterfaceResult::ErrWriteError => Err(WriteError(p_interface.name())),
            HalInterfaceResult::ErrReadError => Err(ReadError(p_interface.name())),
        }
    }
}

unsafe extern "C" {
    pub fn board_init();

    pub fn interface_open(p_interface: Interface) -> HalInterfaceResult;

    pub fn gpio_write(p_pin: u8, p_action: GpioWriteAction) -> HalInterfaceResult;

    pub fn gpio_read(p_pin: u8, p_level: *mut u8) -> HalInterfaceResult;

    pub fn usart_write(p_link: SerialLink, p_data: *const u8, p_len: u16) -> HalInterfaceResult;

    pub fn usart_read(
        p_link: SerialLink,
        p_buffer: *mut u8,
        p_capacity: u16,
        p_len: *mut u16,
    ) -> HalInterfaceResult;

    pub fn timer_start(p_timer: TimerId, p_period_ms: u32) -> HalInterfaceResult;

    pub fn timer_stop(p_timer: TimerId) -> HalInterfaceResult;

    pub fn switch_irq_enable(p_switch: u8) -> HalInterfaceResult;

    pub fn sine_set_frequency(p_frequency: u32) -> HalInterfaceResult;
}

/// [`HalInterface`] implementation on top of the C board drivers.
pub struct BoardHal {
    _private: (),
}

impl BoardHal {
    /// Initializes the board drivers.
    ///
    /// # Safety
    /// The internal call to `board_init` is `unsafe`; it must run once, before any other driver
    /// call, which is guaranteed by taking the only `BoardHal` instance at startup.
    pub fn new() -> Self {
        unsafe { board_init() }
        Self { _private: () }
    }
}

impl Default for BoardHal {
    fn default() -> Self {
        Self::new()
    }
}

impl HalInterface for BoardHal {
    fn open(&mut self, p_interface: Interface) -> HalResult<()> {
        unsafe { interface_open(p_interface) }.to_result(p_interface, "Open", 0)
    }

    fn write(&mut self, p_action: InterfaceWriteActions) -> HalResult<()> {
        let l_name = p_action.name();
        match p_action {
            InterfaceWriteActions::GpioWrite(l_pin, l_action) => {
                if l_pin >= K_GPIO_COUNT {
                    return Err(WrongPin(l_pin));
                }
                unsafe { gpio_write(l_pin, l_action) }.to_result(Interface::Gpio, l_name, l_pin)
            }
            InterfaceWriteActions::UartWrite(l_link, l_data) => {
                // The driver takes at most u16::MAX bytes per call.
                for l_chunk in l_data.bytes().chunks(u16::MAX as usize) {
                    unsafe { usart_write(l_link, l_chunk.as_ptr(), l_chunk.len() as u16) }
                        .to_result(l_link.interface(), l_name, 0)?;
                }
                Ok(())
            }
            InterfaceWriteActions::TimerWrite(l_action) => match l_action {
                TimerActions::Start(l_timer, l_period) => {
                    unsafe { timer_start(l_timer, l_period) }.to_result(
                        l_timer.interface(),
                        l_name,
                        0,
                    )
                }
                TimerActions::Stop(l_timer) => {
                    unsafe { timer_stop(l_timer) }.to_result(l_timer.interface(), l_name, 0)
                }
            },
            InterfaceWriteActions::SwitchIrq(l_switch) => {
                unsafe { switch_irq_enable(l_switch) }.to_result(Interface::Switches, l_name, 0)
            }
            InterfaceWriteActions::SineWrite(l_freq) => {
                unsafe { sine_set_frequency(l_freq) }.to_result(Interface::SineOutput, l_name, 0)
            }
        }
    }

    fn read(&mut self, p_action: InterfaceReadAction) -> HalResult<InterfaceReadResult> {
        let l_name = p_action.name();
        match p_action {
            InterfaceReadAction::GpioRead(l_pin) => {
                if l_pin >= K_GPIO_COUNT {
                    return Err(WrongPin(l_pin));
                }
                let mut l_level: u8 = 0;
                unsafe { gpio_read(l_pin, &mut l_level) }.to_result(
                    Interface::Gpio,
                    l_name,
                    l_pin,
                )?;
                Ok(InterfaceReadResult::GpioLevel(l_level != 0))
            }
            InterfaceReadAction::MemoryRead(l_address) => {
                // The kernel checks the address against the memory map and aligns it.
                let l_word = unsafe { core::ptr::read_volatile(l_address as *const u32) };
                Ok(InterfaceReadResult::Word(l_word))
            }
            InterfaceReadAction::BufferRead(l_link) => {
                let mut l_raw = [0u8; K_BUFFER_SIZE];
                let mut l_len: u16 = 0;
                unsafe {
                    usart_read(
                        l_link,
                        l_raw.as_mut_ptr(),
                        K_BUFFER_SIZE as u16,
                        &mut l_len,
                    )
                }
                .to_result(l_link.interface(), l_name, 0)?;

                let l_len = (l_len as usize).min(K_BUFFER_SIZE);
                let mut l_data = Vec::new();
                l_data
                    .extend_from_slice(&l_raw[..l_len])
                    .map_err(|_| HalError::ReadError(l_link.name()))?;
                Ok(InterfaceReadResult::BufferRead(l_data))
            }
        }
    }
}
