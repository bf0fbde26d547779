use crate::console_output::ConsoleFormatting;
use crate::engine::{Engine, EngineConfig};
use crate::ident::{K_KERNEL_NAME, K_KERNEL_VERSION};
use crate::scheduler::Scheduler;
use crate::{ErrorCounter, KernelError, Milliseconds};
use hal_interface::{
    HalInterface, Interface, InterfaceWriteActions, TimerActions, TimerId,
};
use heapless::format;

/// Configuration parameters for the kernel boot process.
#[derive(Debug, Clone, Copy)]
pub struct BootConfig {
    /// Period of the ticker timer. Ticker delays and periods count these ticks.
    pub ticker_period: Milliseconds,
    /// Interval between two steps of the script worker.
    pub script_step_period: Milliseconds,
    /// Settings of the command engine.
    pub engine: EngineConfig,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            ticker_period: Milliseconds(10),
            script_step_period: Milliseconds(20),
            engine: EngineConfig::default(),
        }
    }
}

/// Counter charged when an interface cannot be opened.
fn open_counter(p_interface: Interface) -> ErrorCounter {
    match p_interface {
        Interface::PrimaryLink | Interface::SecondaryLink => ErrorCounter::Uart,
        Interface::Gpio => ErrorCounter::Gpio,
        Interface::CallbackTimer | Interface::TickerTimer => ErrorCounter::Timer,
        Interface::Switches => ErrorCounter::Callback,
        Interface::SineOutput => ErrorCounter::Sine,
    }
}

/// Initializes the engine and returns the scheduler driving it.
///
/// This function performs the following steps:
/// 1. Opens the primary link and logs the kernel identification.
/// 2. Opens GPIO, callback timer, ticker timer, switches, secondary link and sine output.
/// 3. Starts the ticker timer.
/// 4. Switches LEDs 0-3 off.
///
/// No step is fatal: an interface which cannot be opened is reported as a critical error and
/// only the features relying on it are disabled.
///
/// # Parameters
/// - `p_config`: The [`BootConfig`] containing all necessary parameters for booting.
/// - `p_hal`: The board.
pub fn boot(p_config: BootConfig, p_hal: &mut dyn HalInterface) -> Scheduler {
    let mut l_engine = Engine::new(p_config.engine);

    ////////////////////////////
    // Terminal start
    ////////////////////////////
    match p_hal.open(Interface::PrimaryLink) {
        Ok(()) => l_engine.set_available(Interface::PrimaryLink, true),
        Err(l_e) => l_engine.report_error(
            p_hal,
            &KernelError::HalError(open_counter(Interface::PrimaryLink), l_e),
        ),
    }
    l_engine.log(p_hal, &ConsoleFormatting::Clear);
    l_engine.log(p_hal, &ConsoleFormatting::StrNewLineAfter("Booting..."));
    l_engine.log(
        p_hal,
        &ConsoleFormatting::StrNewLineAfter(
            format!(40; "{} version {}", K_KERNEL_NAME, K_KERNEL_VERSION)
                .unwrap_or_default()
                .as_str(),
        ),
    );

    ////////////////////////////
    // Interfaces
    ////////////////////////////
    for l_interface in [
        Interface::Gpio,
        Interface::CallbackTimer,
        Interface::TickerTimer,
        Interface::Switches,
        Interface::SecondaryLink,
        Interface::SineOutput,
    ] {
        match p_hal.open(l_interface) {
            Ok(()) => l_engine.set_available(l_interface, true),
            Err(l_e) => l_engine.report_error(
                p_hal,
                &KernelError::HalError(open_counter(l_interface), l_e),
            ),
        }
    }

    ////////////////////////////
    // Ticker clock
    ////////////////////////////
    if l_engine.is_available(Interface::TickerTimer) {
        if let Err(l_e) = p_hal.write(InterfaceWriteActions::TimerWrite(TimerActions::Start(
            TimerId::Ticker,
            p_config.ticker_period.to_u32(),
        ))) {
            l_engine.set_available(Interface::TickerTimer, false);
            l_engine.report_error(p_hal, &KernelError::HalError(ErrorCounter::Timer, l_e));
        } else {
            l_engine.log(
                p_hal,
                &ConsoleFormatting::StrNewLineAfter(
                    format!(40; "Ticker period is {}", p_config.ticker_period)
                        .unwrap_or_default()
                        .as_str(),
                ),
            );
        }
    }

    if let Err(l_e) = l_engine.leds_off(p_hal) {
        l_engine.report_error(p_hal, &l_e);
    }

    // Boot completed
    l_engine.log(p_hal, &ConsoleFormatting::StrNewLineBoth("Kernel ready !"));

    Scheduler::new(
        l_engine,
        p_config
            .script_step_period
            .in_periods_of(p_config.ticker_period),
    )
}
