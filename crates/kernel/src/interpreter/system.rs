//! Informational commands: `-about`, `-help`, `-clear`, `-print`, `-memr`, `-error`, `-rem`.

use super::CommandContext;
use crate::command::{self, K_COMMANDS};
use crate::config::{
    K_CALLBACK_COUNT, K_QUEUE_SIZE, K_REGISTER_COUNT, K_SCRIPT_LINES, K_TICKER_COUNT,
};
use crate::console_output::{ConsoleFormatting, ConsoleOutput};
use crate::ident::{K_KERNEL_NAME, K_KERNEL_VERSION};
use crate::{ErrorCounter, KernelError, KernelResult};
use hal_interface::{InterfaceReadAction, InterfaceReadResult};

pub(super) fn about(p_ctx: &mut CommandContext, _p_args: &str) -> KernelResult<()> {
    p_ctx.reply_fmt(format_args!("{} v{}", K_KERNEL_NAME, K_KERNEL_VERSION));
    p_ctx.reply("Command-scheduling terminal engine.");
    p_ctx.reply_fmt(format_args!(
        "Callback slots: {} (queue of {})",
        K_CALLBACK_COUNT, K_QUEUE_SIZE
    ));
    p_ctx.reply_fmt(format_args!("Tickers: {}", K_TICKER_COUNT));
    p_ctx.reply_fmt(format_args!("Registers: {}", K_REGISTER_COUNT));
    p_ctx.reply_fmt(format_args!("Script lines: {}", K_SCRIPT_LINES));
    Ok(())
}

pub(super) fn help(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    let (l_topic, _) = command::split_token(p_args);
    if l_topic.is_empty() {
        p_ctx.reply("Available commands:");
        for l_entry in K_COMMANDS.iter() {
            p_ctx.reply_fmt(format_args!("  {:<12}{}", l_entry.name, l_entry.summary));
        }
        p_ctx.reply("Type -help <command> for its usage.");
        return Ok(());
    }

    match command::find(l_topic) {
        Some(l_entry) => {
            p_ctx.reply_fmt(format_args!("Usage: {}", l_entry.usage));
            p_ctx.reply(l_entry.summary);
        }
        None => p_ctx.reply("Warning: Unknown subcommand. Type -help for available commands."),
    }
    Ok(())
}

pub(super) fn clear(p_ctx: &mut CommandContext, _p_args: &str) -> KernelResult<()> {
    p_ctx.out.write(&ConsoleFormatting::Clear);
    p_ctx.reply("Terminal cleared.");
    Ok(())
}

pub(super) fn print(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    if p_args.is_empty() {
        p_ctx.reply("Warning: No text detected with -print command.");
    } else {
        p_ctx.reply(p_args);
    }
    Ok(())
}

/// Parses a hexadecimal address (optional `0x`) and aligns it down to a word.
fn parse_address(p_text: &str) -> KernelResult<u32> {
    let l_digits = p_text
        .strip_prefix("0x")
        .or_else(|| p_text.strip_prefix("0X"))
        .unwrap_or(p_text);
    u32::from_str_radix(l_digits, 16)
        .map(|l_addr| l_addr & !0x3)
        .map_err(|_| KernelError::InvalidAddress("Invalid address format."))
}

pub(super) fn memr(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    let (l_text, _) = command::split_token(p_args);
    if l_text.is_empty() {
        p_ctx.reply("Warning: Missing address for -memr command.");
        return Ok(());
    }

    let l_address = parse_address(l_text)?;
    if !p_ctx
        .engine
        .config
        .memory_map
        .iter()
        .any(|l_region| l_region.contains(l_address))
    {
        return Err(KernelError::InvalidAddress("Address out of readable range."));
    }

    match p_ctx
        .hal
        .read(InterfaceReadAction::MemoryRead(l_address))
        .map_err(|l_e| KernelError::HalError(ErrorCounter::InvalidAddress, l_e))?
    {
        InterfaceReadResult::Word(l_value) => {
            p_ctx.reply_fmt(format_args!(
                "Memory at 0x{:08X}: 0x{:08X}",
                l_address, l_value
            ));
            Ok(())
        }
        _ => Err(KernelError::InvalidAddress("Unexpected memory read result.")),
    }
}

pub(super) fn error(p_ctx: &mut CommandContext, _p_args: &str) -> KernelResult<()> {
    p_ctx.engine.errors.report(p_ctx.out);
    Ok(())
}

pub(super) fn rem(p_ctx: &mut CommandContext, _p_args: &str) -> KernelResult<()> {
    p_ctx.reply("Remark acknowledged.");
    Ok(())
}
