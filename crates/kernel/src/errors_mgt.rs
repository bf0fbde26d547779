//! Error management for the kernel.
//!
//! Every error raised by a command ends up in [`ErrorsManager::error_handler`], which counts it
//! and writes its diagnostic to the output of the command. No error is fatal.

use crate::console_output::ConsoleFormatting::{StrNewLineAfter, StrNewLineBoth};
use crate::console_output::ConsoleOutput;
use crate::{ErrorCounter, KernelError, KernelErrorLevel};
use heapless::format;

/// Centralized manager for kernel error handling.
///
/// Keeps one counter per error kind, and the highest severity observed so far.
pub struct ErrorsManager {
    counters: [u32; ErrorCounter::K_COUNT],
    has_error: Option<KernelErrorLevel>,
}

impl ErrorsManager {
    pub const fn new() -> ErrorsManager {
        ErrorsManager {
            counters: [0; ErrorCounter::K_COUNT],
            has_error: None,
        }
    }

    /// Handles an error: counts it, then writes its diagnostic on `p_out`.
    ///
    /// # Parameters
    /// - `p_err`: the error to handle.
    /// - `p_out`: output of the command which raised the error.
    pub fn error_handler(&mut self, p_err: &KernelError, p_out: &mut impl ConsoleOutput) {
        self.record(p_err);
        p_out.write(&StrNewLineBoth(p_err.to_string().as_str()));
    }

    /// Counts an error without reporting it, for failures with nowhere to be reported (a
    /// serial write that failed).
    pub fn record(&mut self, p_err: &KernelError) {
        let l_counter = &mut self.counters[p_err.counter().index()];
        *l_counter = l_counter.saturating_add(1);

        let l_level = p_err.severity();
        if self.has_error.is_none_or(|l_current| l_level > l_current) {
            self.has_error = Some(l_level);
        }
    }

    pub fn count(&self, p_counter: ErrorCounter) -> u32 {
        self.counters[p_counter.index()]
    }

    /// Highest severity handled so far, `None` when no error occurred.
    pub fn highest_level(&self) -> Option<KernelErrorLevel> {
        self.has_error
    }

    /// Writes every counter, in taxonomy order.
    pub fn report(&self, p_out: &mut impl ConsoleOutput) {
        p_out.write(&StrNewLineBoth("----------ERROR COUNTS----------"));
        for l_counter in ErrorCounter::K_ALL {
            let l_line: heapless::String<48> =
                format!(48; "{:<26}{}", l_counter.label(), self.count(l_counter)).unwrap_or_default();
            p_out.write(&StrNewLineAfter(l_line.as_str()));
        }
    }
}

impl Default for ErrorsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Response;
    use hal_interface::HalError;

    #[test]
    fn test_error_is_counted_and_reported() {
        let mut l_mgr = ErrorsManager::new();
        let mut l_out = Response::new();
        l_mgr.error_handler(&KernelError::DivisionByZero, &mut l_out);
        l_mgr.error_handler(&KernelError::unknown_operation("FOO"), &mut l_out);

        assert_eq!(l_mgr.count(ErrorCounter::Register), 2);
        assert_eq!(l_mgr.count(ErrorCounter::Script), 0);
        assert!(l_out.contains("Register : Division by zero."));
        assert!(l_out.contains("Unknown operation FOO."));
        assert_eq!(l_mgr.highest_level(), Some(KernelErrorLevel::Error));
    }

    #[test]
    fn test_highest_level_is_kept() {
        let mut l_mgr = ErrorsManager::new();
        l_mgr.record(&KernelError::HalError(
            ErrorCounter::Timer,
            HalError::InterfaceOpenFailed("TICKER_TIMER"),
        ));
        l_mgr.record(&KernelError::GpioError("Invalid GPIO number."));
        assert_eq!(l_mgr.highest_level(), Some(KernelErrorLevel::Critical));
        assert_eq!(l_mgr.count(ErrorCounter::Timer), 1);
        assert_eq!(l_mgr.count(ErrorCounter::Gpio), 1);
    }

    #[test]
    fn test_report_lists_every_counter_in_order() {
        let mut l_mgr = ErrorsManager::new();
        l_mgr.record(&KernelError::BufferOverflow);
        let mut l_out = Response::new();
        l_mgr.report(&mut l_out);

        let mut l_last = 0;
        for l_counter in ErrorCounter::K_ALL {
            let l_pos = l_out.find(l_counter.label()).unwrap();
            assert!(l_pos >= l_last);
            l_last = l_pos;
        }
        assert!(l_out.contains("Buffer overflows          1"));
        assert!(l_out.contains("Network errors            0"));
    }
}
