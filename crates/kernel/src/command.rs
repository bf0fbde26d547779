//! Command tokenizer.
//!
//! A command line is a command name (`-gpio`) followed by free-form arguments. The name is looked
//! up exactly in [`K_COMMANDS`]; arguments are left to the handler.

use crate::{KernelError, KernelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    About,
    Help,
    Clear,
    Print,
    Memr,
    Error,
    Gpio,
    Timer,
    Callback,
    Reset,
    Ticker,
    Reg,
    Script,
    Rem,
    If,
    Uart,
    Sine,
}

impl CommandKind {
    pub const K_COUNT: usize = 17;

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Static description of a command.
pub struct CommandSpec {
    pub name: &'static str,
    pub kind: CommandKind,
    pub usage: &'static str,
    pub summary: &'static str,
}

/// Every command, in help order.
pub const K_COMMANDS: [CommandSpec; CommandKind::K_COUNT] = [
    CommandSpec {
        name: "-about",
        kind: CommandKind::About,
        usage: "-about",
        summary: "Displays system info",
    },
    CommandSpec {
        name: "-help",
        kind: CommandKind::Help,
        usage: "-help [command]",
        summary: "Displays valid commands",
    },
    CommandSpec {
        name: "-clear",
        kind: CommandKind::Clear,
        usage: "-clear",
        summary: "Clears the terminal",
    },
    CommandSpec {
        name: "-print",
        kind: CommandKind::Print,
        usage: "-print <text>",
        summary: "Prints user message",
    },
    CommandSpec {
        name: "-memr",
        kind: CommandKind::Memr,
        usage: "-memr <hex address>",
        summary: "Reads memory location",
    },
    CommandSpec {
        name: "-error",
        kind: CommandKind::Error,
        usage: "-error",
        summary: "Displays error counts",
    },
    CommandSpec {
        name: "-gpio",
        kind: CommandKind::Gpio,
        usage: "-gpio [<number> <r|w|t> [0|1]]",
        summary: "Reads, writes or toggles GPIO lines (6-7 are read-only switches)",
    },
    CommandSpec {
        name: "-timer",
        kind: CommandKind::Timer,
        usage: "-timer <period_ms>",
        summary: "Starts the callback timer (period >= 5 ms)",
    },
    CommandSpec {
        name: "-callback",
        kind: CommandKind::Callback,
        usage: "-callback [<slot 0-2> <count> <payload>]",
        summary: "Sets callbacks to timer (0) and switches (1, 2), count -1 is infinite",
    },
    CommandSpec {
        name: "-reset",
        kind: CommandKind::Reset,
        usage: "-reset [slot]",
        summary: "Resets callbacks, stops the timer and turns LEDs off",
    },
    CommandSpec {
        name: "-ticker",
        kind: CommandKind::Ticker,
        usage: "-ticker [<index 0-15> <initial_delay> <period> <count> <payload>]",
        summary: "Sets periodic command executions, delays in ticks",
    },
    CommandSpec {
        name: "-reg",
        kind: CommandKind::Reg,
        usage: "-reg [<OP> <dest> [src1 [src2]]]",
        summary: "Performs register operations on R0-R31, immediates prefixed with #",
    },
    CommandSpec {
        name: "-script",
        kind: CommandKind::Script,
        usage: "-script [clear | <line> [x | c | <payload>]]",
        summary: "Shows, sets, clears or executes script lines",
    },
    CommandSpec {
        name: "-rem",
        kind: CommandKind::Rem,
        usage: "-rem <text>",
        summary: "Adds remarks in scripts",
    },
    CommandSpec {
        name: "-if",
        kind: CommandKind::If,
        usage: "-if A COND B ? DESTT : DESTF",
        summary: "Conditional execution of a script line or a command",
    },
    CommandSpec {
        name: "-uart",
        kind: CommandKind::Uart,
        usage: "-uart <payload>",
        summary: "Sends a payload on the secondary link",
    },
    CommandSpec {
        name: "-sine",
        kind: CommandKind::Sine,
        usage: "-sine <frequency_hz>",
        summary: "Generates a sine wave on the audio output, 0 stops",
    },
];

/// A recognized command and its (trimmed) arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub kind: CommandKind,
    pub args: &'a str,
}

/// Splits the first whitespace-separated token from the rest, both trimmed.
pub fn split_token(p_text: &str) -> (&str, &str) {
    let l_text = p_text.trim();
    match l_text.find(char::is_whitespace) {
        Some(l_pos) => (&l_text[..l_pos], l_text[l_pos..].trim_start()),
        None => (l_text, ""),
    }
}

/// Finds a command by name. A leading `-` is optional, as in help topics.
pub fn find(p_name: &str) -> Option<&'static CommandSpec> {
    K_COMMANDS
        .iter()
        .find(|l_entry| l_entry.name == p_name || l_entry.name.strip_prefix('-') == Some(p_name))
}

/// Tokenizes a command line.
///
/// # Returns
/// `None` for a blank line.
///
/// # Errors
/// `KernelError::UnknownCommand` when the name is not a command.
pub fn parse(p_line: &str) -> KernelResult<Option<ParsedCommand<'_>>> {
    let (l_name, l_args) = split_token(p_line);
    if l_name.is_empty() {
        return Ok(None);
    }
    K_COMMANDS
        .iter()
        .find(|l_entry| l_entry.name == l_name)
        .map(|l_entry| {
            Some(ParsedCommand {
                kind: l_entry.kind,
                args: l_args,
            })
        })
        .ok_or_else(|| KernelError::unknown_command(p_line.trim()))
}
