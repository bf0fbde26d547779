use crate::KernelError::{
    BufferOverflow, CallbackError, ConditionalError, DivisionByZero, GpioError, HalError,
    InvalidAddress, RegisterError, ResetError, ScriptError, SineError, TickerError, TimerError,
    UartError, UnknownCommand, UnknownOperation,
};
use crate::KernelErrorLevel::{Critical, Error};
use hal_interface::{HalError as HalErrorDef, HalErrorLevel};
use heapless::{String, format};

pub type KernelResult<T> = Result<T, KernelError>;

#[derive(Debug, Clone, Copy, PartialOrd, PartialEq, Eq)]
pub enum KernelErrorLevel {
    Error,
    Critical,
}

impl KernelErrorLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Critical => "Critical error : ",
            Error => "Error : ",
        }
    }
}

/// Error counters, in the order they are reported by `-error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCounter {
    UnknownCommand,
    BufferOverflow,
    InvalidAddress,
    Gpio,
    Timer,
    Callback,
    Reset,
    Ticker,
    Register,
    Script,
    Conditional,
    Uart,
    Sine,
    Network,
}

impl ErrorCounter {
    pub const K_COUNT: usize = 14;

    pub const K_ALL: [ErrorCounter; ErrorCounter::K_COUNT] = [
        ErrorCounter::UnknownCommand,
        ErrorCounter::BufferOverflow,
        ErrorCounter::InvalidAddress,
        ErrorCounter::Gpio,
        ErrorCounter::Timer,
        ErrorCounter::Callback,
        ErrorCounter::Reset,
        ErrorCounter::Ticker,
        ErrorCounter::Register,
        ErrorCounter::Script,
        ErrorCounter::Conditional,
        ErrorCounter::Uart,
        ErrorCounter::Sine,
        ErrorCounter::Network,
    ];

    /// Label used in the `-error` report.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCounter::UnknownCommand => "Unknown commands",
            ErrorCounter::BufferOverflow => "Buffer overflows",
            ErrorCounter::InvalidAddress => "Invalid addresses",
            ErrorCounter::Gpio => "GPIO errors",
            ErrorCounter::Timer => "Timer errors",
            ErrorCounter::Callback => "Callback errors",
            ErrorCounter::Reset => "Reset errors",
            ErrorCounter::Ticker => "Ticker errors",
            ErrorCounter::Register => "Register errors",
            ErrorCounter::Script => "Script errors",
            ErrorCounter::Conditional => "Conditional errors",
            ErrorCounter::Uart => "UART errors",
            ErrorCounter::Sine => "Sine errors",
            ErrorCounter::Network => "Network errors",
        }
    }

    /// Short name of the subsystem, used in diagnostics.
    pub fn topic(&self) -> &'static str {
        match self {
            ErrorCounter::UnknownCommand => "Command",
            ErrorCounter::BufferOverflow => "Input",
            ErrorCounter::InvalidAddress => "Memory",
            ErrorCounter::Gpio => "GPIO",
            ErrorCounter::Timer => "Timer",
            ErrorCounter::Callback => "Callback",
            ErrorCounter::Reset => "Reset",
            ErrorCounter::Ticker => "Ticker",
            ErrorCounter::Register => "Register",
            ErrorCounter::Script => "Script",
            ErrorCounter::Conditional => "Conditional",
            ErrorCounter::Uart => "UART",
            ErrorCounter::Sine => "Sine",
            ErrorCounter::Network => "Network",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    HalError(ErrorCounter, HalErrorDef),
    UnknownCommand(String<32>),
    BufferOverflow,
    InvalidAddress(&'static str),
    GpioError(&'static str),
    TimerError(&'static str),
    CallbackError(&'static str),
    ResetError(&'static str),
    TickerError(&'static str),
    RegisterError(&'static str),
    UnknownOperation(String<16>),
    DivisionByZero,
    ScriptError(&'static str),
    ConditionalError(&'static str),
    UartError(&'static str),
    SineError(&'static str),
}

impl KernelError {
    /// Builds an `UnknownCommand` error, truncating very long names.
    pub fn unknown_command(p_name: &str) -> KernelError {
        UnknownCommand(truncated(p_name))
    }

    /// Builds an `UnknownOperation` error, truncating very long names.
    pub fn unknown_operation(p_name: &str) -> KernelError {
        UnknownOperation(truncated(p_name))
    }

    /// Returns the counter incremented when this error is handled.
    pub fn counter(&self) -> ErrorCounter {
        match self {
            HalError(l_counter, _) => *l_counter,
            UnknownCommand(_) => ErrorCounter::UnknownCommand,
            BufferOverflow => ErrorCounter::BufferOverflow,
            InvalidAddress(_) => ErrorCounter::InvalidAddress,
            GpioError(_) => ErrorCounter::Gpio,
            TimerError(_) => ErrorCounter::Timer,
            CallbackError(_) => ErrorCounter::Callback,
            ResetError(_) => ErrorCounter::Reset,
            TickerError(_) => ErrorCounter::Ticker,
            RegisterError(_) | UnknownOperation(_) | DivisionByZero => ErrorCounter::Register,
            ScriptError(_) => ErrorCounter::Script,
            ConditionalError(_) => ErrorCounter::Conditional,
            UartError(_) => ErrorCounter::Uart,
            SineError(_) => ErrorCounter::Sine,
        }
    }

    pub fn to_string(&self) -> String<256> {
        let mut l_msg = String::new();
        if let HalError(_, l_e) = self {
            l_msg.push_str(l_e.to_string().as_str()).unwrap_or(());
            return l_msg;
        }

        l_msg.push_str(self.severity().as_str()).unwrap_or(());
        let l_detail: String<200> = match self {
            UnknownCommand(l_name) => format!(200; "Unknown command {}.", l_name),
            BufferOverflow => format!(200; "Input too long. Command ignored."),
            DivisionByZero => format!(200; "{} : Division by zero.", self.counter().topic()),
            UnknownOperation(l_op) => {
                format!(200; "{} : Unknown operation {}.", self.counter().topic(), l_op)
            }
            InvalidAddress(l_err)
            | GpioError(l_err)
            | TimerError(l_err)
            | CallbackError(l_err)
            | ResetError(l_err)
            | TickerError(l_err)
            | RegisterError(l_err)
            | ScriptError(l_err)
            | ConditionalError(l_err)
            | UartError(l_err)
            | SineError(l_err) => format!(200; "{} : {}", self.counter().topic(), l_err),
            HalError(..) => Ok(String::new()),
        }
        .unwrap_or_default();
        l_msg.push_str(l_detail.as_str()).unwrap_or(());
        l_msg
    }

    /// Returns the severity level of the kernel error.
    ///
    /// Only HAL errors can be critical (an interface that could not be opened); every command
    /// error is a plain `Error`.
    pub fn severity(&self) -> KernelErrorLevel {
        match self {
            HalError(_, l_err) => match l_err.severity() {
                HalErrorLevel::Critical => Critical,
                HalErrorLevel::Error => Error,
            },
            _ => Error,
        }
    }
}

fn truncated<const N: usize>(p_text: &str) -> String<N> {
    let mut l_out = String::new();
    for l_c in p_text.chars() {
        if l_out.push(l_c).is_err() {
            break;
        }
    }
    l_out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_maps_to_its_counter() {
        assert_eq!(DivisionByZero.counter(), ErrorCounter::Register);
        assert_eq!(
            KernelError::unknown_operation("FOO").counter(),
            ErrorCounter::Register
        );
        assert_eq!(
            HalError(ErrorCounter::Uart, HalErrorDef::WriteError("SERIAL_AUX")).counter(),
            ErrorCounter::Uart
        );
        assert_eq!(BufferOverflow.counter(), ErrorCounter::BufferOverflow);
    }

    #[test]
    fn test_counter_order_matches_report_order() {
        for (l_idx, l_counter) in ErrorCounter::K_ALL.iter().enumerate() {
            assert_eq!(l_counter.index(), l_idx);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            KernelError::unknown_command("-foo").to_string().as_str(),
            "Error : Unknown command -foo."
        );
        assert_eq!(
            DivisionByZero.to_string().as_str(),
            "Error : Register : Division by zero."
        );
        assert_eq!(
            GpioError("Invalid pin number.").to_string().as_str(),
            "Error : GPIO : Invalid pin number."
        );
    }

    #[test]
    fn test_open_failure_is_critical() {
        let l_err = HalError(
            ErrorCounter::Timer,
            HalErrorDef::InterfaceOpenFailed("TICKER_TIMER"),
        );
        assert_eq!(l_err.severity(), Critical);
        assert!(l_err.to_string().starts_with("HAL Critical error : "));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let l_err = KernelError::unknown_command("-abcdefghijklmnopqrstuvwxyzabcdefghij");
        if let UnknownCommand(l_name) = l_err {
            assert_eq!(l_name.len(), 32);
        } else {
            panic!("wrong variant");
        }
    }
}
