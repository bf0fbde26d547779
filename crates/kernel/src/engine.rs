//! The command engine: every piece of state the commands act on, and the entry points through
//! which events reach the interpreter.
//!
//! All methods take the HAL as a parameter: the engine never owns hardware, which keeps it usable
//! with [`hal_interface::mock::MockHal`] on the host.

use crate::callbacks::{CallbackBank, CallbackSlot};
use crate::config::{K_DEFAULT_MEMORY_MAP, K_LED_COUNT, K_TICKER_COUNT, MemoryRegion, Response};
use crate::console_output::{self, ConsoleFormatting, ConsoleOutput};
use crate::errors_mgt::ErrorsManager;
use crate::interpreter::{self, CommandContext};
use crate::registers::RegisterFile;
use crate::script::{ScriptStep, ScriptStore};
use crate::terminal::{LineBuffer, LineEvent};
use crate::tickers::TickerBank;
use crate::{Count, ErrorCounter, KernelError, KernelResult, Milliseconds};
use hal_interface::{
    GpioWriteAction, HalInterface, Interface, InterfaceReadAction, InterfaceReadResult,
    InterfaceWriteActions, SerialLink, TimerActions, TimerId,
};

/// Run-time settings of the engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Log operand values and the chosen branch of `-if`.
    pub verbose_conditionals: bool,
    /// Address ranges readable with `-memr`.
    pub memory_map: &'static [MemoryRegion],
    /// Sample rate of the sine output, bounds `-sine` to half of it.
    pub sine_sample_rate: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verbose_conditionals: false,
            memory_map: &K_DEFAULT_MEMORY_MAP,
            sine_sample_rate: 8000,
        }
    }
}

/// State of the callback timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallbackTimer {
    /// Period set by the last `-timer` command.
    pub period: Option<Milliseconds>,
    pub running: bool,
}

pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) errors: ErrorsManager,
    pub(crate) registers: RegisterFile,
    pub(crate) scripts: ScriptStore,
    pub(crate) callbacks: CallbackBank,
    pub(crate) tickers: TickerBank,
    pub(crate) timer: CallbackTimer,
    available: u8,
    inputs: [LineBuffer; 2],
}

impl Engine {
    pub const fn new(p_config: EngineConfig) -> Engine {
        Engine {
            config: p_config,
            errors: ErrorsManager::new(),
            registers: RegisterFile::new(),
            scripts: ScriptStore::new(),
            callbacks: CallbackBank::new(),
            tickers: TickerBank::new(),
            timer: CallbackTimer {
                period: None,
                running: false,
            },
            available: 0,
            inputs: [LineBuffer::new(), LineBuffer::new()],
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn errors(&self) -> &ErrorsManager {
        &self.errors
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn scripts(&self) -> &ScriptStore {
        &self.scripts
    }

    pub fn scripts_mut(&mut self) -> &mut ScriptStore {
        &mut self.scripts
    }

    pub fn callbacks(&self) -> &CallbackBank {
        &self.callbacks
    }

    pub fn tickers(&self) -> &TickerBank {
        &self.tickers
    }

    pub fn timer(&self) -> CallbackTimer {
        self.timer
    }

    /// Marks an interface as opened (usable) or not.
    pub fn set_available(&mut self, p_interface: Interface, p_available: bool) {
        let l_bit = 1 << (p_interface as u8);
        if p_available {
            self.available |= l_bit;
        } else {
            self.available &= !l_bit;
        }
    }

    pub fn is_available(&self, p_interface: Interface) -> bool {
        self.available & (1 << (p_interface as u8)) != 0
    }

    /// Fails with `p_err` when the interface could not be opened at boot.
    pub(crate) fn require(&self, p_interface: Interface, p_err: KernelError) -> KernelResult<()> {
        if self.is_available(p_interface) {
            Ok(())
        } else {
            Err(p_err)
        }
    }

    /// Handles an error raised outside of any command: counts it and reports it on the primary
    /// link.
    pub fn report_error(&mut self, p_hal: &mut dyn HalInterface, p_err: &KernelError) {
        let mut l_out = Response::new();
        self.errors.error_handler(p_err, &mut l_out);
        self.deliver(p_hal, SerialLink::Primary, &l_out);
    }

    /// Writes a log line on the primary link.
    pub fn log(&mut self, p_hal: &mut dyn HalInterface, p_fmt: &ConsoleFormatting) {
        let mut l_out = Response::new();
        l_out.write(p_fmt);
        self.deliver(p_hal, SerialLink::Primary, &l_out);
    }

    /// Executes one command line, capturing its output (diagnostics included) in `p_out`.
    ///
    /// Output longer than `p_out` is flushed on `p_output` as it is produced, the remainder stays
    /// in `p_out`.
    pub fn execute(
        &mut self,
        p_hal: &mut dyn HalInterface,
        p_origin: SerialLink,
        p_output: SerialLink,
        p_line: &str,
        p_out: &mut Response,
    ) {
        let l_result = {
            let mut l_ctx = CommandContext {
                engine: &mut *self,
                hal: &mut *p_hal,
                origin: p_origin,
                sink: p_output,
                out: &mut *p_out,
            };
            interpreter::execute(&mut l_ctx, p_line)
        };
        if let Err(l_err) = l_result {
            self.errors.error_handler(&l_err, p_out);
        }
    }

    /// Executes one command line and sends its output on `p_output`.
    pub fn run_line(
        &mut self,
        p_hal: &mut dyn HalInterface,
        p_origin: SerialLink,
        p_output: SerialLink,
        p_line: &str,
    ) {
        let mut l_out = Response::new();
        self.execute(p_hal, p_origin, p_output, p_line, &mut l_out);
        self.deliver(p_hal, p_output, &l_out);
    }

    /// Sends output on a link. A failed write is only counted: there is nowhere to report it.
    pub(crate) fn deliver(&mut self, p_hal: &mut dyn HalInterface, p_link: SerialLink, p_data: &str) {
        if !self.is_available(p_link.interface()) {
            return;
        }
        if let Err(l_err) = console_output::send(p_hal, p_link, p_data.as_bytes()) {
            self.errors.record(&l_err);
        }
    }

    /// Reads the bytes pending on a serial link and executes the completed lines.
    ///
    /// The primary link echoes its input. Lines received on the secondary link are executed with
    /// their output sent to the primary link.
    pub fn poll_input(&mut self, p_hal: &mut dyn HalInterface, p_link: SerialLink) {
        if !self.is_available(p_link.interface()) {
            return;
        }
        let l_bytes = match p_hal.read(InterfaceReadAction::BufferRead(p_link)) {
            Ok(InterfaceReadResult::BufferRead(l_bytes)) => l_bytes,
            Ok(_) => return,
            Err(l_err) => {
                self.errors.record(&KernelError::HalError(ErrorCounter::Uart, l_err));
                return;
            }
        };

        let l_echo = p_link == SerialLink::Primary;
        for l_byte in l_bytes {
            match self.inputs[p_link as usize].process_byte(l_byte) {
                LineEvent::Stored(l_c) if l_echo => {
                    self.log(p_hal, &ConsoleFormatting::Char(l_c));
                }
                LineEvent::Erased if l_echo => {
                    self.log(p_hal, &ConsoleFormatting::StrNoFormatting("\x08 \x08"));
                }
                LineEvent::Empty if l_echo => self.log(p_hal, &ConsoleFormatting::Newline),
                LineEvent::Line(l_line) => {
                    if l_echo {
                        self.log(p_hal, &ConsoleFormatting::Newline);
                    }
                    self.run_line(p_hal, p_link, SerialLink::Primary, &l_line);
                }
                LineEvent::Overflow => {
                    let l_err = match p_link {
                        SerialLink::Primary => KernelError::BufferOverflow,
                        SerialLink::Secondary => {
                            KernelError::UartError("Input too long, command will be ignored.")
                        }
                    };
                    self.report_error(p_hal, &l_err);
                }
                _ => {}
            }
        }
    }

    /// Advances the tickers by one tick and runs the payloads which are due, each with its
    /// output sent on the ticker link.
    pub fn advance_tickers(&mut self, p_hal: &mut dyn HalInterface) {
        let l_due = self.tickers.advance();
        for l_idx in (0..K_TICKER_COUNT).filter(|l_idx| l_due & (1 << l_idx) != 0) {
            let Some(l_ticker) = self.tickers.get(l_idx) else {
                continue;
            };
            let (l_payload, l_channel) = (l_ticker.payload.clone(), l_ticker.channel);
            self.run_line(p_hal, l_channel, l_channel, &l_payload);
        }
    }

    /// Runs one step of the script worker.
    ///
    /// # Returns
    /// `false` when the script queue was empty.
    pub fn script_step(&mut self, p_hal: &mut dyn HalInterface) -> bool {
        match self.scripts.step() {
            None => false,
            Some(ScriptStep::Execute(l_entry)) => {
                self.run_line(p_hal, l_entry.channel, l_entry.channel, &l_entry.command);
                true
            }
            Some(ScriptStep::Expanded(_)) => true,
            Some(ScriptStep::Failed(l_channel, l_err)) => {
                let mut l_out = Response::new();
                self.errors.error_handler(&l_err, &mut l_out);
                self.deliver(p_hal, l_channel, &l_out);
                true
            }
        }
    }

    /// Arms a callback slot with one payload.
    ///
    /// Button slots get their switch interrupt enabled. The timer slot restarts the callback
    /// timer when a period was set with `-timer`.
    ///
    /// # Errors
    /// - `KernelError::CallbackError` when the switches are unavailable.
    /// - `KernelError::HalError` when the interrupt cannot be enabled.
    pub fn configure_callback(
        &mut self,
        p_hal: &mut dyn HalInterface,
        p_slot: CallbackSlot,
        p_count: Count,
        p_payload: &str,
        p_channel: SerialLink,
    ) -> KernelResult<()> {
        if let Some(l_switch) = p_slot.switch_number() {
            self.require(
                Interface::Switches,
                KernelError::CallbackError("Switches are unavailable."),
            )?;
            p_hal
                .write(InterfaceWriteActions::SwitchIrq(l_switch))
                .map_err(|l_e| KernelError::HalError(ErrorCounter::Callback, l_e))?;
        }

        self.callbacks
            .slot_mut(p_slot)
            .configure(p_count, p_payload, p_channel);

        if p_slot == CallbackSlot::Timer
            && let Some(l_period) = self.timer.period
            && self.is_available(Interface::CallbackTimer)
        {
            self.start_timer(p_hal, l_period)?;
        }
        Ok(())
    }

    /// Sets the callback timer period and starts the timer.
    ///
    /// Periods of at least 100 ms deliver the timer slot output in one write. The output being
    /// delivered by the slot is dropped.
    ///
    /// # Errors
    /// `KernelError::TimerError` when the period is below the minimum or the timer is
    /// unavailable, `KernelError::HalError` when it cannot be started.
    pub fn set_timer_period(
        &mut self,
        p_hal: &mut dyn HalInterface,
        p_period: Milliseconds,
    ) -> KernelResult<()> {
        if p_period.to_u32() < crate::config::K_MIN_TIMER_PERIOD_MS {
            return Err(KernelError::TimerError(
                "Failed to open timer. Period must be at least 5 ms.",
            ));
        }
        self.require(
            Interface::CallbackTimer,
            KernelError::TimerError("Failed to open timer."),
        )?;

        self.start_timer(p_hal, p_period)?;
        self.timer.period = Some(p_period);
        self.callbacks
            .set_timer_atomic(p_period.to_u32() >= crate::config::K_LARGE_INTERVAL_MS);
        self.callbacks.slot_mut(CallbackSlot::Timer).drop_output();
        Ok(())
    }

    fn start_timer(&mut self, p_hal: &mut dyn HalInterface, p_period: Milliseconds) -> KernelResult<()> {
        p_hal
            .write(InterfaceWriteActions::TimerWrite(TimerActions::Start(
                TimerId::Callback,
                p_period.to_u32(),
            )))
            .map_err(|l_e| KernelError::HalError(ErrorCounter::Timer, l_e))?;
        self.timer.running = true;
        Ok(())
    }

    fn stop_timer(&mut self, p_hal: &mut dyn HalInterface) {
        if !self.timer.running {
            return;
        }
        self.timer.running = false;
        if let Err(l_e) = p_hal.write(InterfaceWriteActions::TimerWrite(TimerActions::Stop(
            TimerId::Callback,
        ))) {
            self.errors
                .record(&KernelError::HalError(ErrorCounter::Timer, l_e));
        }
    }

    /// One tick of a callback slot: executes the head payload when no output is in flight, then
    /// delivers the output (in one write, or one chunk per tick).
    pub fn callback_tick(&mut self, p_hal: &mut dyn HalInterface, p_slot: CallbackSlot) {
        if !self.callbacks.slot(p_slot).is_ready() {
            return;
        }

        if let Some(l_payload) = self.callbacks.slot_mut(p_slot).begin() {
            let l_channel = self.callbacks.slot(p_slot).channel();
            let mut l_out = Response::new();
            self.execute(p_hal, l_channel, l_channel, &l_payload, &mut l_out);
            self.callbacks.slot_mut(p_slot).load_output(l_out);
        }

        let l_atomic = self.callbacks.is_atomic(p_slot);
        let l_slot = self.callbacks.slot_mut(p_slot);
        let l_channel = l_slot.channel();
        let l_chunk = l_slot.take_chunk(l_atomic);
        if !l_chunk.is_empty()
            && self.available & (1 << (l_channel.interface() as u8)) != 0
            && let Err(l_err) = console_output::send(p_hal, l_channel, l_chunk)
        {
            self.errors.record(&l_err);
        }
        self.callbacks.slot_mut(p_slot).finish();
    }

    /// Tick of the callback timer. The timer is stopped once the timer slot is drained.
    pub fn timer_tick(&mut self, p_hal: &mut dyn HalInterface) {
        self.callback_tick(p_hal, CallbackSlot::Timer);
        if self.callbacks.slot(CallbackSlot::Timer).is_drained() {
            self.stop_timer(p_hal);
        }
    }

    /// Press of a switch.
    pub fn switch_tick(&mut self, p_hal: &mut dyn HalInterface, p_switch: u8) {
        let l_slot = match p_switch {
            1 => CallbackSlot::Switch1,
            2 => CallbackSlot::Switch2,
            _ => return,
        };
        self.callback_tick(p_hal, l_slot);
    }

    /// Resets one callback slot. Resetting the timer slot stops the timer.
    pub fn reset_callback(&mut self, p_hal: &mut dyn HalInterface, p_slot: CallbackSlot) {
        self.callbacks.slot_mut(p_slot).reset();
        if p_slot == CallbackSlot::Timer {
            self.stop_timer(p_hal);
        }
    }

    /// Resets every callback slot, stops the timer and deactivates the tickers.
    pub fn reset_all(&mut self, p_hal: &mut dyn HalInterface) {
        self.callbacks.reset_all();
        self.stop_timer(p_hal);
        self.tickers.deactivate_all();
    }

    /// Switches LEDs 0-3 off.
    ///
    /// # Errors
    /// `KernelError::HalError` when a line cannot be written.
    pub fn leds_off(&mut self, p_hal: &mut dyn HalInterface) -> KernelResult<()> {
        if !self.is_available(Interface::Gpio) {
            return Ok(());
        }
        for l_pin in 0..K_LED_COUNT {
            p_hal
                .write(InterfaceWriteActions::GpioWrite(l_pin, GpioWriteAction::Clear))
                .map_err(|l_e| KernelError::HalError(ErrorCounter::Gpio, l_e))?;
        }
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal_interface::mock::MockHal;

    fn engine_with_all(p_hal: &mut MockHal) -> Engine {
        let mut l_engine = Engine::default();
        for l_if in [
            Interface::PrimaryLink,
            Interface::SecondaryLink,
            Interface::Gpio,
            Interface::CallbackTimer,
            Interface::TickerTimer,
            Interface::Switches,
            Interface::SineOutput,
        ] {
            p_hal.open(l_if).unwrap();
            l_engine.set_available(l_if, true);
        }
        l_engine
    }

    #[test]
    fn test_availability_flags() {
        let mut l_engine = Engine::default();
        assert!(!l_engine.is_available(Interface::Gpio));
        l_engine.set_available(Interface::Gpio, true);
        l_engine.set_available(Interface::SineOutput, true);
        l_engine.set_available(Interface::Gpio, false);
        assert!(!l_engine.is_available(Interface::Gpio));
        assert!(l_engine.is_available(Interface::SineOutput));
    }

    #[test]
    fn test_callback_tick_toggles_and_goes_idle() {
        let mut l_hal = MockHal::new();
        let mut l_engine = engine_with_all(&mut l_hal);
        l_engine
            .configure_callback(
                &mut l_hal,
                CallbackSlot::Timer,
                Count::Finite(3),
                "-gpio 0 t",
                SerialLink::Primary,
            )
            .unwrap();

        for _ in 0..5 {
            l_engine.timer_tick(&mut l_hal);
        }
        assert_eq!(l_hal.toggle_count(0), 3);
        let l_slot = l_engine.callbacks().slot(CallbackSlot::Timer);
        assert!(l_slot.count().is_idle());
        assert_eq!(l_slot.queued(), 0);
    }

    #[test]
    fn test_timer_stops_once_drained() {
        let mut l_hal = MockHal::new();
        let mut l_engine = engine_with_all(&mut l_hal);
        l_engine.set_timer_period(&mut l_hal, Milliseconds(10)).unwrap();
        l_engine
            .configure_callback(
                &mut l_hal,
                CallbackSlot::Timer,
                Count::Finite(1),
                "-rem tick",
                SerialLink::Primary,
            )
            .unwrap();
        assert_eq!(l_hal.timer_period(TimerId::Callback), Some(10));

        l_engine.timer_tick(&mut l_hal);
        assert_eq!(l_hal.timer_period(TimerId::Callback), None);
        assert!(!l_engine.timer().running);
    }

    #[test]
    fn test_button_slot_needs_switches() {
        let mut l_hal = MockHal::new();
        let mut l_engine = Engine::default();
        assert_eq!(
            l_engine.configure_callback(
                &mut l_hal,
                CallbackSlot::Switch1,
                Count::Infinite,
                "-gpio 1 t",
                SerialLink::Primary,
            ),
            Err(KernelError::CallbackError("Switches are unavailable."))
        );
        assert!(l_engine.callbacks().slot(CallbackSlot::Switch1).head().is_none());

        l_engine.set_available(Interface::Switches, true);
        l_engine
            .configure_callback(
                &mut l_hal,
                CallbackSlot::Switch1,
                Count::Infinite,
                "-gpio 1 t",
                SerialLink::Primary,
            )
            .unwrap();
        assert!(l_hal.switch_irq_enabled(1));
    }

    #[test]
    fn test_timer_period_bounds() {
        let mut l_hal = MockHal::new();
        let mut l_engine = engine_with_all(&mut l_hal);
        assert!(l_engine.set_timer_period(&mut l_hal, Milliseconds(4)).is_err());
        l_engine.set_timer_period(&mut l_hal, Milliseconds(100)).unwrap();
        assert!(l_engine.callbacks().is_atomic(CallbackSlot::Timer));

        l_engine.set_available(Interface::CallbackTimer, false);
        assert_eq!(
            l_engine.set_timer_period(&mut l_hal, Milliseconds(50)),
            Err(KernelError::TimerError("Failed to open timer."))
        );
    }

    #[test]
    fn test_secondary_input_runs_with_primary_output() {
        let mut l_hal = MockHal::new();
        let mut l_engine = engine_with_all(&mut l_hal);
        l_hal.inject_rx(SerialLink::Secondary, b"-print remote\n");
        l_engine.poll_input(&mut l_hal, SerialLink::Secondary);

        assert!(l_hal.output(SerialLink::Primary).contains("remote"));
        assert!(l_hal.output(SerialLink::Secondary).is_empty());
    }

    #[test]
    fn test_primary_input_is_echoed() {
        let mut l_hal = MockHal::new();
        let mut l_engine = engine_with_all(&mut l_hal);
        l_hal.inject_rx(SerialLink::Primary, b"-rem a\r");
        l_engine.poll_input(&mut l_hal, SerialLink::Primary);

        let l_out = l_hal.output(SerialLink::Primary);
        assert!(l_out.starts_with("-rem a\r\n"));
        assert!(l_out.contains("Remark acknowledged."));
    }

    #[test]
    fn test_overflow_is_counted_per_link() {
        let mut l_hal = MockHal::new();
        let mut l_engine = engine_with_all(&mut l_hal);
        let l_long = [b'a'; 400];
        for l_link in [SerialLink::Primary, SerialLink::Secondary] {
            l_hal.inject_rx(l_link, &l_long);
            l_hal.inject_rx(l_link, b"\r");
            for _ in 0..8 {
                l_engine.poll_input(&mut l_hal, l_link);
            }
        }
        assert_eq!(l_engine.errors().count(ErrorCounter::BufferOverflow), 1);
        assert_eq!(l_engine.errors().count(ErrorCounter::Uart), 1);
        assert!(l_hal.output(SerialLink::Primary).contains("Input too long. Command ignored."));
    }
}
