//! Deferred execution commands: `-timer`, `-callback`, `-reset`, `-ticker`.

use super::CommandContext;
use crate::callbacks::CallbackSlot;
use crate::command;
use crate::config::{K_TICKER_COUNT, Payload};
use crate::{Count, KernelError, KernelResult, Milliseconds};

pub(super) fn timer(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    let l_period = p_args
        .parse::<u32>()
        .map_err(|_| KernelError::TimerError("Invalid timer period."))?;
    p_ctx
        .engine
        .set_timer_period(p_ctx.hal, Milliseconds(l_period))?;
    p_ctx.reply_fmt(format_args!("Timer started with period {} ms.", l_period));
    Ok(())
}

fn callback_status(p_ctx: &mut CommandContext) {
    p_ctx.reply("----- Callback Status -----");
    for l_slot in CallbackSlot::K_ALL {
        let l_callback = p_ctx.engine.callbacks.slot(l_slot);
        let l_count = l_callback.count();
        let l_payload = l_callback.head().map(|l_head| {
            let mut l_text = Payload::new();
            l_text.push_str(l_head).unwrap_or(());
            l_text
        });
        if l_count.is_idle() {
            p_ctx.reply_fmt(format_args!("Callback {}: Inactive", l_slot.index()));
        } else {
            p_ctx.reply_fmt(format_args!(
                "Callback {}: Active (Count: {})",
                l_slot.index(),
                l_count
            ));
        }
        match l_payload {
            Some(l_text) => p_ctx.reply_fmt(format_args!("   Payload: {}", l_text)),
            None => p_ctx.reply("   Payload: None"),
        }
    }
}

pub(super) fn callback(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    if p_args.is_empty() {
        callback_status(p_ctx);
        return Ok(());
    }

    let (l_slot_text, l_rest) = command::split_token(p_args);
    let (l_count_text, l_payload) = command::split_token(l_rest);
    let l_slot = l_slot_text
        .parse::<usize>()
        .map_err(|_| KernelError::CallbackError("Invalid callback index. Use 0, 1, or 2."))
        .and_then(CallbackSlot::from_index)?;
    let l_count = Count::parse(l_count_text)
        .ok_or(KernelError::CallbackError("Count must be -1 or positive."))?;
    if l_payload.is_empty() {
        return Err(KernelError::CallbackError("Missing callback payload."));
    }

    let l_origin = p_ctx.origin;
    p_ctx
        .engine
        .configure_callback(p_ctx.hal, l_slot, l_count, l_payload, l_origin)?;
    p_ctx.reply_fmt(format_args!(
        "Callback {} set with count {} and payload: {}",
        l_slot.index(),
        l_count,
        l_payload
    ));
    Ok(())
}

pub(super) fn reset(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    let (l_slot_text, _) = command::split_token(p_args);
    let l_slot = if l_slot_text.is_empty() {
        None
    } else {
        let l_slot = l_slot_text
            .parse::<usize>()
            .ok()
            .and_then(|l_idx| CallbackSlot::from_index(l_idx).ok())
            .ok_or(KernelError::ResetError("Invalid callback index. Use 0, 1, or 2."))?;
        Some(l_slot)
    };

    p_ctx.engine.leds_off(p_ctx.hal)?;
    match l_slot {
        Some(l_slot) => {
            p_ctx.engine.reset_callback(p_ctx.hal, l_slot);
            p_ctx.reply_fmt(format_args!(
                "Callback {} has been reset & LEDs toggled off.",
                l_slot.index()
            ));
        }
        None => {
            p_ctx.engine.reset_all(p_ctx.hal);
            p_ctx.reply("All callbacks, timers, & LEDs are deactivated.");
        }
    }
    Ok(())
}

fn ticker_status(p_ctx: &mut CommandContext) {
    p_ctx.reply("----- Ticker Status -----");
    for l_idx in 0..K_TICKER_COUNT {
        let Some(l_ticker) = p_ctx.engine.tickers.get(l_idx).cloned() else {
            continue;
        };
        if !l_ticker.active {
            p_ctx.reply_fmt(format_args!("Ticker {}: Inactive", l_idx));
            continue;
        }
        p_ctx.reply_fmt(format_args!("Ticker {}: Active", l_idx));
        p_ctx.reply_fmt(format_args!("  Initial Delay: {}", l_ticker.initial_delay));
        p_ctx.reply_fmt(format_args!("  Period: {}", l_ticker.period));
        p_ctx.reply_fmt(format_args!("  Count: {}", l_ticker.count));
        p_ctx.reply_fmt(format_args!("  Payload: {}", l_ticker.payload));
    }
}

pub(super) fn ticker(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    if p_args.is_empty() {
        ticker_status(p_ctx);
        return Ok(());
    }

    let (l_index, l_rest) = command::split_token(p_args);
    let (l_delay, l_rest) = command::split_token(l_rest);
    let (l_period, l_rest) = command::split_token(l_rest);
    let (l_count, l_payload) = command::split_token(l_rest);
    if l_payload.is_empty() {
        return Err(KernelError::TickerError(
            "Usage: -ticker <index> <initial_delay> <period> <count> <payload>",
        ));
    }

    let l_index = l_index
        .parse::<usize>()
        .map_err(|_| KernelError::TickerError("Invalid ticker index."))?;
    let l_delay = l_delay
        .parse::<u32>()
        .map_err(|_| KernelError::TickerError("Invalid initial delay."))?;
    let l_period = l_period
        .parse::<u32>()
        .map_err(|_| KernelError::TickerError("Period must be positive."))?;
    let l_count =
        Count::parse(l_count).ok_or(KernelError::TickerError("Count must be -1 or positive."))?;

    let l_origin = p_ctx.origin;
    p_ctx
        .engine
        .tickers
        .arm(l_index, l_delay, l_period, l_count, l_payload, l_origin)?;
    p_ctx.reply_fmt(format_args!(
        "Ticker {} set with initial delay {}, period {}, count {} and payload: {}",
        l_index, l_delay, l_period, l_count, l_payload
    ));
    Ok(())
}
