//! This module defines the `HalError` and `HalErrorLevel` enumerations and their associated
//! functionality. It provides a structured way to represent hardware abstraction layer (HAL)
//! related errors with different severity levels and format them for the terminal.

use crate::HalError::{
    IncompatibleAction, InterfaceNotFound, InterfaceOpenFailed, ReadError, ReadOnlyInterface,
    UnknownError, WriteError, WrongPin,
};
use crate::HalErrorLevel::{Critical, Error};
use heapless::{String, format};

pub type HalResult<T> = Result<T, HalError>;

/// Represents the severity levels of hardware abstraction layer (HAL) errors.
///
/// # Variants
///
/// - `Critical`
///   The interface is unusable. The feature relying on it must be disabled, the rest of the
///   system keeps running.
///
/// - `Error`
///   A single operation failed. The interface stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalErrorLevel {
    Critical,
    Error,
}

impl HalErrorLevel {
    /// Converts the `HalErrorLevel` enum variant into a corresponding string slice representation.
    ///
    /// # Returns
    ///
    /// - `"HAL Critical error : "` for `HalErrorLevel::Critical` variant.
    /// - `"HAL Error : "` for `HalErrorLevel::Error` variant.
    pub fn as_str(&self) -> &str {
        match self {
            Critical => "HAL Critical error : ",
            Error => "HAL Error : ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    InterfaceNotFound(&'static str),
    InterfaceOpenFailed(&'static str),
    WrongPin(u8),
    ReadOnlyInterface(&'static str),
    IncompatibleAction(&'static str, &'static str),
    WriteError(&'static str),
    ReadError(&'static str),
    UnknownError,
}

impl HalError {
    /// Converts the error into a formatted string representation with a maximum size of 256
    /// characters.
    ///
    /// The message is prefixed with the severity level returned by [`HalError::severity`].
    ///
    /// # Returns
    /// A `String` with the descriptive message for the error.
    ///
    /// # Errors
    /// The function itself does not fail: a message that does not fit is truncated.
    pub fn to_string(&self) -> String<256> {
        let mut l_msg = String::new();
        l_msg.push_str(self.severity().as_str()).unwrap_or(());
        let l_detail: String<200> = match self {
            InterfaceNotFound(l_name) => format!(200; "Interface {} not found", l_name),
            InterfaceOpenFailed(l_name) => format!(200; "Interface {} could not be opened", l_name),
            WrongPin(l_pin) => format!(200; "GPIO line {} does not exist", l_pin),
            ReadOnlyInterface(l_name) => format!(200; "Interface {} is read-only", l_name),
            IncompatibleAction(l_action, l_interface) => format!(200;
                "Action {} is not compatible with interface {}", l_action, l_interface),
            WriteError(l_name) => format!(200; "Error during write on interface {}", l_name),
            ReadError(l_name) => format!(200; "Error during read on interface {}", l_name),
            UnknownError => format!(200; "Unknown HAL error"),
        }
        .unwrap_or_default();
        l_msg.push_str(l_detail.as_str()).unwrap_or(());
        l_msg
    }

    /// Returns the severity level of the `HalError` instance.
    ///
    /// Open failures and missing interfaces are critical: the interface cannot be used at all.
    /// Everything else concerns a single operation.
    pub fn severity(&self) -> HalErrorLevel {
        match self {
            InterfaceNotFound(_) => Critical,
            InterfaceOpenFailed(_) => Critical,
            WrongPin(_) => Error,
            ReadOnlyInterface(_) => Error,
            IncompatibleAction(_, _) => Error,
            WriteError(_) => Error,
            ReadError(_) => Error,
            UnknownError => Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_carries_severity_prefix() {
        let l_err = InterfaceOpenFailed("TICKER_TIMER");
        assert_eq!(l_err.severity(), Critical);
        assert_eq!(
            l_err.to_string().as_str(),
            "HAL Critical error : Interface TICKER_TIMER could not be opened"
        );
    }

    #[test]
    fn test_operation_errors_are_not_critical() {
        assert_eq!(WrongPin(9).severity(), Error);
        assert_eq!(
            WrongPin(9).to_string().as_str(),
            "HAL Error : GPIO line 9 does not exist"
        );
    }
}
