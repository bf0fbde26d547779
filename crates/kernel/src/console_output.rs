use crate::{ErrorCounter, KernelError, KernelResult};
use hal_interface::{HalInterface, InterfaceWriteActions, SerialLink, UartWriteActions};
use heapless::String;

/// Console output formatting directives used by every console write.
///
/// This enum describes how a given string or character should be emitted, including whether
/// to surround it with newlines or clear the terminal. Newlines are CRLF.
pub enum ConsoleFormatting<'a> {
    /// No formatting is done.
    StrNoFormatting(&'a str),
    /// New line is added after write.
    StrNewLineAfter(&'a str),
    /// New line is added before write.
    StrNewLineBefore(&'a str),
    /// New lines are added before and after write.
    StrNewLineBoth(&'a str),
    /// Only adds a new line.
    Newline,
    /// Writes a single character.
    Char(char),
    /// Clears the terminal.
    Clear,
}

const K_NEWLINE: &str = "\r\n";
const K_CLEAR: &str = "\x1B[2J\x1B[H";

/// Destination of formatted console output.
///
/// Commands never write to a serial link directly: they write into a capture buffer which the
/// caller delivers (at once, or in chunks for callback slots).
pub trait ConsoleOutput {
    /// Appends raw text. Text that does not fit is dropped.
    fn put_str(&mut self, p_data: &str);

    /// Writes `p_fmt` applying its formatting directive.
    fn write(&mut self, p_fmt: &ConsoleFormatting) {
        match p_fmt {
            ConsoleFormatting::StrNoFormatting(l_s) => self.put_str(l_s),
            ConsoleFormatting::StrNewLineAfter(l_s) => {
                self.put_str(l_s);
                self.put_str(K_NEWLINE);
            }
            ConsoleFormatting::StrNewLineBefore(l_s) => {
                self.put_str(K_NEWLINE);
                self.put_str(l_s);
            }
            ConsoleFormatting::StrNewLineBoth(l_s) => {
                self.put_str(K_NEWLINE);
                self.put_str(l_s);
                self.put_str(K_NEWLINE);
            }
            ConsoleFormatting::Newline => self.put_str(K_NEWLINE),
            ConsoleFormatting::Char(l_c) => {
                let mut l_buf = [0u8; 4];
                self.put_str(l_c.encode_utf8(&mut l_buf));
            }
            ConsoleFormatting::Clear => self.put_str(K_CLEAR),
        }
    }
}

impl<const N: usize> ConsoleOutput for String<N> {
    fn put_str(&mut self, p_data: &str) {
        for l_c in p_data.chars() {
            if self.push(l_c).is_err() {
                break;
            }
        }
    }
}

/// Sends bytes on a serial link.
///
/// # Errors
/// Returns [`KernelError::HalError`] tagged with the UART counter when the driver refuses the
/// write.
pub fn send(
    p_hal: &mut dyn HalInterface,
    p_link: SerialLink,
    p_data: &[u8],
) -> KernelResult<()> {
    if p_data.is_empty() {
        return Ok(());
    }
    p_hal
        .write(InterfaceWriteActions::UartWrite(
            p_link,
            UartWriteActions::SendBytes(p_data),
        ))
        .map_err(|l_e| KernelError::HalError(ErrorCounter::Uart, l_e))
}
