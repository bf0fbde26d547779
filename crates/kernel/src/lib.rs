#![cfg_attr(not(test), no_std)]
//! TermOS kernel: a command-scheduling engine for a serial terminal.
//!
//! Commands reach the interpreter from the serial links, three callback slots (callback timer
//! and two switches), sixteen tickers and the script worker. Interrupt handlers only raise
//! [`EventFlags`]; the [`Scheduler`] consumes them on the main loop.

mod boot;
pub mod callbacks;
pub mod command;
pub mod conditional;
pub mod config;
mod console_output;
pub mod engine;
mod errors_mgt;
mod ident;
pub mod interpreter;
pub mod registers;
mod ring_buffer;
mod scheduler;
pub mod script;
pub mod terminal;
pub mod tickers;
mod types;

pub use boot::{BootConfig, boot};
pub use console_output::{ConsoleFormatting, ConsoleOutput};
pub use engine::{Engine, EngineConfig};
pub use errors_mgt::ErrorsManager;
pub use ident::{K_KERNEL_NAME, K_KERNEL_VERSION};
pub use scheduler::{EventFlags, Scheduler};
pub use types::*;
