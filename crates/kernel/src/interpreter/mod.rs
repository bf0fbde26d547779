//! Command interpreter.
//!
//! Every command source (serial links, callback slots, tickers, script worker, `-if` branches)
//! goes through [`execute`]. Handlers validate their arguments before touching any state, write
//! their reply into the context output and return the error to be reported, if any.

use crate::command::{self, CommandKind};
use crate::KernelResult;
use crate::config::{K_RESPONSE_SIZE, Response};
use crate::console_output::{ConsoleFormatting, ConsoleOutput};
use crate::engine::Engine;
use hal_interface::{HalInterface, SerialLink};
use heapless::{String, format};

mod io;
mod machine;
mod scheduling;
mod system;

/// Everything a command handler may act on.
pub struct CommandContext<'a> {
    pub engine: &'a mut Engine,
    pub hal: &'a mut dyn HalInterface,
    /// Link the command came from. Commands arming deferred work (callbacks, tickers, scripts)
    /// send that work's output here.
    pub origin: SerialLink,
    /// Link the captured output is delivered on. A reply that would overflow `out` first flushes
    /// it there.
    pub sink: SerialLink,
    pub out: &'a mut Response,
}

impl CommandContext<'_> {
    /// Writes one reply line.
    pub(crate) fn reply(&mut self, p_text: &str) {
        if self.out.len() + p_text.len() + 2 > K_RESPONSE_SIZE {
            self.flush();
        }
        self.out.write(&ConsoleFormatting::StrNewLineAfter(p_text));
    }

    /// Delivers the output captured so far on the sink link.
    pub(crate) fn flush(&mut self) {
        if self.out.is_empty() {
            return;
        }
        self.engine.deliver(self.hal, self.sink, self.out.as_str());
        self.out.clear();
    }

    /// Writes one formatted reply line.
    pub(crate) fn reply_fmt(&mut self, p_args: core::fmt::Arguments) {
        let l_line: String<512> = format!(512; "{}", p_args).unwrap_or_default();
        self.reply(l_line.as_str());
    }
}

type CommandHandler = fn(&mut CommandContext, &str) -> KernelResult<()>;

/// Handlers, indexed by [`CommandKind`].
const K_HANDLERS: [CommandHandler; CommandKind::K_COUNT] = [
    system::about,
    system::help,
    system::clear,
    system::print,
    system::memr,
    system::error,
    io::gpio,
    scheduling::timer,
    scheduling::callback,
    scheduling::reset,
    scheduling::ticker,
    machine::reg,
    machine::script,
    system::rem,
    machine::conditional,
    io::uart,
    io::sine,
];

/// Executes one command line. Blank lines do nothing.
///
/// # Errors
/// The error raised by the tokenizer or the handler. Nothing has been modified when an error is
/// returned.
pub fn execute(p_ctx: &mut CommandContext, p_line: &str) -> KernelResult<()> {
    match command::parse(p_line)? {
        None => Ok(()),
        Some(l_cmd) => K_HANDLERS[l_cmd.kind.index()](p_ctx, l_cmd.args),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::Response;
    use crate::engine::Engine;
    use hal_interface::mock::MockHal;
    use hal_interface::{HalInterface, Interface, SerialLink};

    /// Engine with every interface opened on a mock board.
    pub fn setup() -> (Engine, MockHal) {
        let mut l_hal = MockHal::new();
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
            l_hal.open(l_if).unwrap();
            l_engine.set_available(l_if, true);
        }
        (l_engine, l_hal)
    }

    /// Runs a line from the primary link and returns its output.
    pub fn run(p_engine: &mut Engine, p_hal: &mut MockHal, p_line: &str) -> Response {
        let mut l_out = Response::new();
        p_engine.execute(p_hal, SerialLink::Primary, SerialLink::Primary, p_line, &mut l_out);
        l_out
    }
}
