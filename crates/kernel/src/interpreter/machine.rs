//! Programmable commands: `-reg`, `-script`, `-if`.

use super::{CommandContext, execute};
use crate::command;
use crate::conditional::{self, Condition, Destination};
use crate::config::Payload;
use crate::registers::{RegisterOp, parse_operand, parse_register};
use crate::{KernelError, KernelResult};

pub(super) fn reg(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    let mut l_tokens = p_args.split_whitespace();
    let Some(l_op) = l_tokens.next() else {
        p_ctx.reply("----- Register Status -----");
        for l_idx in 0..crate::config::K_REGISTER_COUNT {
            let l_value = p_ctx.engine.registers.get(l_idx);
            p_ctx.reply_fmt(format_args!("R{}: {}", l_idx, l_value));
        }
        return Ok(());
    };

    let l_op = RegisterOp::from_name(l_op)?;
    let l_dest = l_tokens
        .next()
        .ok_or(KernelError::RegisterError("Missing destination register."))
        .and_then(|l_name| {
            parse_register(l_name).ok_or(KernelError::RegisterError("Invalid register name."))
        })?;
    let l_src1 = l_tokens.next().map(parse_operand).transpose()?;
    let l_src2 = l_tokens.next().map(parse_operand).transpose()?;
    if l_tokens.next().is_some() {
        return Err(KernelError::RegisterError("Too many operands."));
    }

    let l_value = p_ctx.engine.registers.execute(l_op, l_dest, l_src1, l_src2)?;
    p_ctx.reply_fmt(format_args!("Operation completed. R{} = {}", l_dest, l_value));
    Ok(())
}

fn script_listing(p_ctx: &mut CommandContext) {
    p_ctx.reply("----- Script Space -----");
    for l_idx in 0..crate::config::K_SCRIPT_LINES {
        let Some(l_line) = p_ctx.engine.scripts.line(l_idx).map(owned) else {
            continue;
        };
        p_ctx.reply_fmt(format_args!("{:2}: {}", l_idx, l_line));
    }
}

fn owned(p_text: &str) -> Payload {
    let mut l_text = Payload::new();
    l_text.push_str(p_text).unwrap_or(());
    l_text
}

pub(super) fn script(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    let (l_first, l_rest) = command::split_token(p_args);
    if l_first.is_empty() {
        script_listing(p_ctx);
        return Ok(());
    }
    if l_first == "clear" && l_rest.is_empty() {
        p_ctx.engine.scripts.clear_all();
        p_ctx.reply("Entire script space cleared and script execution halted.");
        return Ok(());
    }

    let l_line = l_first
        .parse::<usize>()
        .ok()
        .filter(|l_n| *l_n < crate::config::K_SCRIPT_LINES)
        .ok_or(KernelError::ScriptError("Invalid script line number."))?;

    match l_rest {
        "" => {
            let l_text = p_ctx.engine.scripts.line(l_line).map(owned);
            match l_text {
                Some(l_text) => p_ctx.reply_fmt(format_args!("Line {}: {}", l_line, l_text)),
                None => p_ctx.reply_fmt(format_args!("Line {}: <empty>", l_line)),
            }
        }
        "x" => {
            let l_origin = p_ctx.origin;
            p_ctx.engine.scripts.execute_from(l_line, l_origin)?;
            p_ctx.reply("Script execution started.");
        }
        "c" => {
            p_ctx.engine.scripts.clear_line(l_line)?;
            p_ctx.reply_fmt(format_args!("Script line {} cleared.", l_line));
        }
        l_text => {
            let l_stored = owned(p_ctx.engine.scripts.set_line(l_line, l_text)?);
            p_ctx.reply_fmt(format_args!("Script line {} set to: {}", l_line, l_stored));
        }
    }
    Ok(())
}

pub(super) fn conditional(p_ctx: &mut CommandContext, p_args: &str) -> KernelResult<()> {
    let l_condition = Condition::parse(p_args)?;
    let (l_left, l_right, l_outcome) = l_condition.evaluate(&p_ctx.engine.registers)?;
    if p_ctx.engine.config.verbose_conditionals {
        p_ctx.reply_fmt(format_args!(
            "Debug: values: {} {} {}",
            l_left,
            l_condition.comparison.symbol(),
            l_right
        ));
        p_ctx.reply_fmt(format_args!("Debug: result: {}", l_outcome));
    }

    let l_branch = l_condition.branch(l_outcome);
    match conditional::destination(l_branch) {
        Destination::Nothing => Ok(()),
        Destination::ScriptLine(l_line) if p_ctx.engine.scripts.line(l_line).is_some() => {
            let l_origin = p_ctx.origin;
            p_ctx.engine.scripts.execute_from(l_line, l_origin)?;
            Ok(())
        }
        Destination::ScriptLine(_) | Destination::Command(_) => execute(p_ctx, l_branch),
    }
}

#[cfg(test)]
mod tests {
    use crate::ErrorCounter;
    use crate::config::K_SCRIPT_LINES;
    use crate::engine::{Engine, EngineConfig};
    use crate::interpreter::test_support::{run, setup};
    use hal_interface::SerialLink;

    #[test]
    fn test_reg_operations() {
        let (mut l_engine, mut l_hal) = setup();
        run(&mut l_engine, &mut l_hal, "-reg MOV R1 #10");
        let l_out = run(&mut l_engine, &mut l_hal, "-reg ADD R0 R1 #5");
        assert_eq!(l_out.as_str(), "Operation completed. R0 = 15\r\n");
        assert_eq!(l_engine.registers().get(0), 15);

        run(&mut l_engine, &mut l_hal, "-reg MOV R4 #7");
        assert!(run(&mut l_engine, &mut l_hal, "-reg INC R4").contains("R4 = 8"));

        run(&mut l_engine, &mut l_hal, "-reg MOV R2 #3");
        let l_out = run(&mut l_engine, &mut l_hal, "-reg DIV R2 R3 #0");
        assert!(l_out.contains("Division by zero."));
        assert_eq!(l_engine.registers().get(2), 3);
        assert_eq!(l_engine.errors().count(ErrorCounter::Register), 1);
    }

    #[test]
    fn test_reg_rejects_malformed_input() {
        let (mut l_engine, mut l_hal) = setup();
        for l_line in [
            "-reg FOO R0 #1",
            "-reg MOV R32 #1",
            "-reg MOV R0 #x",
            "-reg MOV R0",
            "-reg ADD R0 #1 #2 #3",
            "-reg XCG R0 #1",
        ] {
            run(&mut l_engine, &mut l_hal, l_line);
        }
        assert_eq!(l_engine.errors().count(ErrorCounter::Register), 6);
        assert!(l_engine.registers().iter().all(|(_, l_v)| l_v == 0));
    }

    #[test]
    fn test_reg_listing() {
        let (mut l_engine, mut l_hal) = setup();
        run(&mut l_engine, &mut l_hal, "-reg MOV R31 #-4");
        let l_out = run(&mut l_engine, &mut l_hal, "-reg");
        assert!(l_out.starts_with("----- Register Status -----"));
        assert!(l_out.contains("R0: 0"));
        assert!(l_out.contains("R31: -4"));
    }

    #[test]
    fn test_script_accessors() {
        let (mut l_engine, mut l_hal) = setup();
        assert!(
            run(&mut l_engine, &mut l_hal, "-script 3 print hi")
                .contains("Script line 3 set to: -print hi")
        );
        assert!(run(&mut l_engine, &mut l_hal, "-script 3").contains("Line 3: -print hi"));
        assert!(run(&mut l_engine, &mut l_hal, "-script 4").contains("Line 4: <empty>"));
        assert!(run(&mut l_engine, &mut l_hal, "-script").contains(" 3: -print hi"));
        assert!(run(&mut l_engine, &mut l_hal, "-script 3 c").contains("Script line 3 cleared."));
        assert!(l_engine.scripts().line(3).is_none());

        assert!(run(&mut l_engine, &mut l_hal, "-script 64 -rem").contains("Invalid script line number."));
        assert!(run(&mut l_engine, &mut l_hal, "-script 3 x").contains("Cannot execute empty script line."));
        assert_eq!(l_engine.errors().count(ErrorCounter::Script), 2);
    }

    #[test]
    fn test_listing_of_a_full_store_is_complete() {
        let (mut l_engine, mut l_hal) = setup();
        for l_idx in 0..K_SCRIPT_LINES {
            let l_text = std::format!("-print line number {} with some text to fill it up", l_idx);
            l_engine.scripts_mut().set_line(l_idx, &l_text).unwrap();
        }

        let l_rest = run(&mut l_engine, &mut l_hal, "-script");
        let l_listing = l_hal.output(SerialLink::Primary) + l_rest.as_str();
        assert!(l_listing.starts_with("----- Script Space -----\r\n"));
        for l_idx in 0..K_SCRIPT_LINES {
            let l_entry = std::format!("{:2}: -print line number {} with", l_idx, l_idx);
            assert!(l_listing.contains(l_entry.as_str()), "line {} missing", l_idx);
        }
        assert!(l_listing.ends_with("with some text to fill it up\r\n"));
    }

    #[test]
    fn test_script_execute_and_clear() {
        let (mut l_engine, mut l_hal) = setup();
        run(&mut l_engine, &mut l_hal, "-script 0 -reg INC R0");
        run(&mut l_engine, &mut l_hal, "-script 1 -reg INC R0");
        assert!(run(&mut l_engine, &mut l_hal, "-script 0 x").contains("Script execution started."));
        assert_eq!(l_engine.scripts().pending(), 2);

        let l_out = run(&mut l_engine, &mut l_hal, "-script clear");
        assert!(l_out.contains("Entire script space cleared and script execution halted."));
        assert_eq!(l_engine.scripts().pending(), 0);
        assert!(l_engine.scripts().line(0).is_none());
    }

    #[test]
    fn test_if_runs_script_or_literal() {
        let (mut l_engine, mut l_hal) = setup();
        run(&mut l_engine, &mut l_hal, "-script 10 -rem from script");

        run(&mut l_engine, &mut l_hal, "-reg MOV R0 #6");
        let l_out = run(&mut l_engine, &mut l_hal, "-if R0 > #5 ? -script 10 : -print false");
        assert!(l_out.is_empty());
        assert_eq!(l_engine.scripts().pending(), 1);
        l_engine.scripts_mut().stop();

        run(&mut l_engine, &mut l_hal, "-reg MOV R0 #3");
        let l_out = run(&mut l_engine, &mut l_hal, "-if R0 > #5 ? -script 10 : -print false");
        assert_eq!(l_out.as_str(), "false\r\n");
        assert_eq!(l_engine.scripts().pending(), 0);
    }

    #[test]
    fn test_if_empty_script_line_runs_as_command() {
        let (mut l_engine, mut l_hal) = setup();
        let l_out = run(&mut l_engine, &mut l_hal, "-if 0 = #0 ? 12 : ");
        assert!(l_out.contains("Unknown command 12."));
        assert!(run(&mut l_engine, &mut l_hal, "-if 0 = #1 ? 12 : ").is_empty());
        assert!(run(&mut l_engine, &mut l_hal, "-if R0 #1 ? a : b").contains("Missing comparison operator."));
        assert_eq!(l_engine.errors().count(ErrorCounter::Conditional), 1);
    }

    #[test]
    fn test_if_debug_output_is_verbose_only() {
        let (_, mut l_hal) = setup();
        let mut l_engine = Engine::new(EngineConfig {
            verbose_conditionals: true,
            ..EngineConfig::default()
        });
        let l_out = run(&mut l_engine, &mut l_hal, "-if #2 < #3 ? -rem yes : -rem no");
        assert!(l_out.contains("Debug: values: 2 < 3"));
        assert!(l_out.contains("Debug: result: true"));
        assert!(l_out.contains("Remark acknowledged."));
    }
}
