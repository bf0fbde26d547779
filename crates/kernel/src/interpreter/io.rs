//! Peripheral commands: `-gpio`, `-uart`, `-sine`.

use super::CommandContext;
use crate::config::{K_MAX_CMD_LENGTH, K_SWITCH_PINS};
use crate::{ErrorCounter, KernelError, KernelResult};
use hal_interface::{
    GpioWriteAction, Interface, InterfaceReadAction, InterfaceReadResult, InterfaceWriteActions,
    K_GPIO_COUNT, SerialLink, UartWriteActions,
};
use heapless::String;

fn read_level(p_ctx: &mut CommandContext, p_pin: u8) -> KernelResult<u8> {
    match p_ctx
        .hal
        .read(InterfaceReadAction::GpioRead(p_pin))
        .map_err(|l_e| KernelError::HalError(ErrorCounter::Gpio, l_e))?
    {
        InterfaceReadResult::GpioLevel(l_level) => Ok(l_level as u8),
        _ => Err(KernelError::GpioError("Unexpected GPIO read result.")),
    }
}

fn write_pin(p_ctx: &mut CommandContext, p_pin: u8, p_action: GpioWriteAction) -> KernelResult<()> {
    if K_SWITCH_PINS.contains(&p_pin) {
        return Err(KernelError::GpioError("Switches can only be read."));
    }
    p_ctx
        .hal
        .write(InterfaceWriteActions::GpioWrite(p_pin, p_action))
        .map_err(|l_e| KernelError::HalError(ErrorCounter::Gpio, l_e))
}

pub(super) fn gpio(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    p_ctx
        .engine
        .require(Interface::Gpio, KernelError::GpioError("GPIO is unavailable."))?;

    let mut l_tokens = p_args.split_whitespace();
    let Some(l_pin_text) = l_tokens.next() else {
        for l_pin in 0..K_GPIO_COUNT {
            let l_level = read_level(p_ctx, l_pin)?;
            p_ctx.reply_fmt(format_args!("GPIO {}: {}", l_pin, l_level));
        }
        return Ok(());
    };

    let l_pin = l_pin_text
        .parse::<u8>()
        .ok()
        .filter(|l_pin| *l_pin < K_GPIO_COUNT)
        .ok_or(KernelError::GpioError("Invalid GPIO number."))?;

    match (l_tokens.next(), l_tokens.next()) {
        (Some("r"), None) => {
            let l_level = read_level(p_ctx, l_pin)?;
            p_ctx.reply_fmt(format_args!("GPIO {} value: {}", l_pin, l_level));
        }
        (Some("w"), Some(l_value)) => {
            let l_action = match l_value {
                "0" => GpioWriteAction::Clear,
                "1" => GpioWriteAction::Set,
                _ => return Err(KernelError::GpioError("Value must be 0 or 1.")),
            };
            write_pin(p_ctx, l_pin, l_action)?;
            p_ctx.reply_fmt(format_args!("GPIO {} set to {}", l_pin, l_value));
        }
        (Some("w"), None) => return Err(KernelError::GpioError("Missing value for write.")),
        (Some("t"), None) => {
            write_pin(p_ctx, l_pin, GpioWriteAction::Toggle)?;
            let l_level = read_level(p_ctx, l_pin)?;
            p_ctx.reply_fmt(format_args!("GPIO {} toggled to {}", l_pin, l_level));
        }
        _ => return Err(KernelError::GpioError("Unknown GPIO operation. Use r, w or t.")),
    }
    Ok(())
}

pub(super) fn uart(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    if p_args.is_empty() {
        return Err(KernelError::UartError("Must attach a payload to -uart"));
    }
    p_ctx.engine.require(
        Interface::SecondaryLink,
        KernelError::UartError("Secondary link is unavailable."),
    )?;

    let mut l_line: String<{ K_MAX_CMD_LENGTH + 1 }> = String::new();
    l_line
        .push_str(p_args)
        .map_err(|_| KernelError::UartError("Payload too long."))?;
    l_line
        .push('\n')
        .map_err(|_| KernelError::UartError("Payload too long."))?;
    p_ctx
        .hal
        .write(InterfaceWriteActions::UartWrite(
            SerialLink::Secondary,
            UartWriteActions::SendString(&l_line),
        ))
        .map_err(|l_e| KernelError::HalError(ErrorCounter::Uart, l_e))?;
    p_ctx.reply_fmt(format_args!(
        "Payload sent through {}: {}",
        SerialLink::Secondary.name(),
        p_args
    ));
    Ok(())
}

pub(super) fn sine(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    p_ctx.engine.require(
        Interface::SineOutput,
        KernelError::SineError("Sine output is unavailable."),
    )?;
    let l_frequency = p_args
        .parse::<u32>()
        .map_err(|_| KernelError::SineError("Invalid frequency."))?;

    let l_nyquist = p_ctx.engine.config.sine_sample_rate / 2;
    if l_frequency > l_nyquist {
        p_ctx.reply_fmt(format_args!(
            "Frequency {} Hz exceeds Nyquist limit ({} Hz)",
            l_frequency, l_nyquist
        ));
        return Err(KernelError::SineError("Frequency too high."));
    }

    p_ctx
        .hal
        .write(InterfaceWriteActions::SineWrite(l_frequency))
        .map_err(|l_e| KernelError::HalError(ErrorCounter::Sine, l_e))?;
    if l_frequency == 0 {
        p_ctx.reply("Sine wave has stopped generating...");
    } else {
        p_ctx.reply_fmt(format_args!("Generating {} Hz sine wave!", l_frequency));
    }
    Ok(())
}
