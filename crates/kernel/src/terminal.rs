//! Line input of the serial links.
//!
//! Bytes are accumulated until CR or LF. A line longer than a command is flagged as overflowed
//! and discarded at its terminator.

use crate::config::Payload;

const K_BACKSPACE: u8 = 0x08;
const K_DELETE: u8 = 0x7F;

/// Result of feeding one byte to a [`LineBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// The byte was stored and should be echoed.
    Stored(char),
    /// The last stored character was erased.
    Erased,
    /// The byte was dropped (control character, or the line already overflowed).
    Ignored,
    /// A complete, non-blank line.
    Line(Payload),
    /// A terminator ended a blank line.
    Empty,
    /// A terminator ended a line which was too long.
    Overflow,
}

#[derive(Debug, Default)]
pub struct LineBuffer {
    line: Payload,
    overflowed: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            line: Payload::new(),
            overflowed: false,
        }
    }

    /// Feeds one received byte.
    pub fn process_byte(&mut self, p_byte: u8) -> LineEvent {
        match p_byte {
            b'\r' | b'\n' => {
                let l_overflowed = self.overflowed;
                self.overflowed = false;
                let l_line = core::mem::take(&mut self.line);
                if l_overflowed {
                    LineEvent::Overflow
                } else if l_line.trim().is_empty() {
                    LineEvent::Empty
                } else {
                    LineEvent::Line(l_line)
                }
            }
            K_BACKSPACE | K_DELETE => {
                if !self.overflowed && self.line.pop().is_some() {
                    LineEvent::Erased
                } else {
                    LineEvent::Ignored
                }
            }
            0x20..=0x7E => {
                if self.overflowed {
                    LineEvent::Ignored
                } else if self.line.push(p_byte as char).is_err() {
                    self.overflowed = true;
                    LineEvent::Ignored
                } else {
                    LineEvent::Stored(p_byte as char)
                }
            }
            _ => LineEvent::Ignored,
        }
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }
}
