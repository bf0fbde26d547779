//! Parsing and evaluation of `-if` expressions: `A COND B ? destT : destF`.

use crate::config::K_SCRIPT_LINES;
use crate::registers::{Operand, RegisterFile, parse_operand};
use crate::script::parse_script_directive;
use crate::{KernelError, KernelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    Equal,
    Less,
}

impl Comparison {
    // Scan priority: '>' first, then '=', then '<'.
    const K_SCAN_ORDER: [(char, Comparison); 3] = [
        ('>', Comparison::Greater),
        ('=', Comparison::Equal),
        ('<', Comparison::Less),
    ];

    pub fn symbol(&self) -> char {
        match self {
            Comparison::Greater => '>',
            Comparison::Equal => '=',
            Comparison::Less => '<',
        }
    }

    pub fn holds(&self, p_left: i32, p_right: i32) -> bool {
        match self {
            Comparison::Greater => p_left > p_right,
            Comparison::Equal => p_left == p_right,
            Comparison::Less => p_left < p_right,
        }
    }
}

/// A parsed `-if` expression. All slices are trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition<'a> {
    pub left: &'a str,
    pub comparison: Comparison,
    pub right: &'a str,
    pub on_true: &'a str,
    pub on_false: &'a str,
}

/// Where a branch goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination<'a> {
    /// Run the script from this line.
    ScriptLine(usize),
    /// Execute the text as a command.
    Command(&'a str),
    /// Empty branch.
    Nothing,
}

impl<'a> Condition<'a> {
    /// Parses an expression.
    ///
    /// The first `?` and the first `:` after it split the expression. The operator is the first
    /// of `>`, `=`, `<` (in that priority) found before the `?`.
    ///
    /// # Errors
    /// `KernelError::ConditionalError` when `?`, `:`, the operator or an operand is missing.
    pub fn parse(p_expr: &'a str) -> KernelResult<Condition<'a>> {
        let l_question = p_expr
            .find('?')
            .ok_or(KernelError::ConditionalError("Missing '?' in expression."))?;
        let (l_test, l_branches) = (&p_expr[..l_question], &p_expr[l_question + 1..]);
        let l_colon = l_branches
            .find(':')
            .ok_or(KernelError::ConditionalError("Missing ':' in expression."))?;

        let (l_symbol, l_comparison) = Comparison::K_SCAN_ORDER
            .iter()
            .find(|(l_symbol, _)| l_test.contains(*l_symbol))
            .ok_or(KernelError::ConditionalError("Missing comparison operator."))?;
        let l_op_pos = l_test.find(*l_symbol).unwrap_or(0);

        let l_left = l_test[..l_op_pos].trim();
        let l_right = l_test[l_op_pos + l_symbol.len_utf8()..].trim();
        if l_left.is_empty() || l_right.is_empty() {
            return Err(KernelError::ConditionalError("Missing operand."));
        }

        Ok(Condition {
            left: l_left,
            comparison: *l_comparison,
            right: l_right,
            on_true: l_branches[..l_colon].trim(),
            on_false: l_branches[l_colon + 1..].trim(),
        })
    }

    /// Evaluates the comparison against the register file.
    ///
    /// # Returns
    /// `(left value, right value, outcome)`.
    ///
    /// # Errors
    /// `KernelError::ConditionalError` when an operand cannot be resolved.
    pub fn evaluate(&self, p_registers: &RegisterFile) -> KernelResult<(i32, i32, bool)> {
        let l_left = p_registers.resolve(resolve_operand(self.left)?);
        let l_right = p_registers.resolve(resolve_operand(self.right)?);
        Ok((l_left, l_right, self.comparison.holds(l_left, l_right)))
    }

    pub fn branch(&self, p_outcome: bool) -> &'a str {
        if p_outcome { self.on_true } else { self.on_false }
    }
}

/// Operand rule of the register machine. A bare token gets an implicit `R`, which
/// `parse_operand` already does for digits, the only bare tokens naming a register.
fn resolve_operand(p_token: &str) -> KernelResult<Operand> {
    parse_operand(p_token).map_err(|_| KernelError::ConditionalError("Invalid operand."))
}

/// Classifies a branch target.
///
/// A number within the script bounds, or a `-script N` / `-script N x` directive, designates a
/// script line. Anything else is a literal command.
pub fn destination(p_target: &str) -> Destination<'_> {
    let l_target = p_target.trim();
    if l_target.is_empty() {
        return Destination::Nothing;
    }
    if l_target.bytes().all(|l_b| l_b.is_ascii_digit()) {
        if let Ok(l_line) = l_target.parse::<usize>() {
            if l_line < K_SCRIPT_LINES {
                return Destination::ScriptLine(l_line);
            }
        }
    }
    if let Some(l_line) = parse_script_directive(l_target, false) {
        return Destination::ScriptLine(l_line);
    }
    Destination::Command(l_target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shape() {
        let l_cond = Condition::parse("R0 > #5 ? -script 10 : -print false").unwrap();
        assert_eq!(l_cond.left, "R0");
        assert_eq!(l_cond.comparison, Comparison::Greater);
        assert_eq!(l_cond.right, "#5");
        assert_eq!(l_cond.on_true, "-script 10");
        assert_eq!(l_cond.on_false, "-print false");
    }

    #[test]
    fn test_operator_priority() {
        // '>' wins over '<' regardless of position.
        let l_cond = Condition::parse("R1 < R2 > R3 ? a : b").unwrap();
        assert_eq!(l_cond.comparison, Comparison::Greater);
        assert_eq!(l_cond.left, "R1 < R2");
    }

    #[test]
    fn test_colon_before_question_mark_is_ignored() {
        let l_cond = Condition::parse("R1 = #0 ? -print a:b : -print c").unwrap();
        assert_eq!(l_cond.on_true, "-print a");
        assert_eq!(l_cond.on_false, "b : -print c");
    }

    #[test]
    fn test_parse_errors() {
        assert!(Condition::parse("R0 > #5 -print a : -print b").is_err());
        assert!(Condition::parse("R0 > #5 ? -print a").is_err());
        assert!(Condition::parse("R0 #5 ? a : b").is_err());
        assert!(Condition::parse(" > #5 ? a : b").is_err());
    }

    #[test]
    fn test_evaluate() {
        let mut l_regs = RegisterFile::new();
        l_regs.set(0, 6);
        let l_cond = Condition::parse("R0 > #5 ? yes : no").unwrap();
        assert_eq!(l_cond.evaluate(&l_regs), Ok((6, 5, true)));
        assert_eq!(l_cond.branch(true), "yes");

        l_regs.set(0, 3);
        assert_eq!(l_cond.evaluate(&l_regs), Ok((3, 5, false)));
        assert_eq!(l_cond.branch(false), "no");
    }

    #[test]
    fn test_bare_operand_is_a_register() {
        let mut l_regs = RegisterFile::new();
        l_regs.set(2, 9);
        let l_cond = Condition::parse("2 = #9 ? a : b").unwrap();
        assert_eq!(l_cond.evaluate(&l_regs), Ok((9, 9, true)));

        let l_bad = Condition::parse("x = #9 ? a : b").unwrap();
        assert!(l_bad.evaluate(&l_regs).is_err());
    }

    #[test]
    fn test_destinations() {
        assert_eq!(destination("10"), Destination::ScriptLine(10));
        assert_eq!(destination("-script 10"), Destination::ScriptLine(10));
        assert_eq!(destination("-script 10 x"), Destination::ScriptLine(10));
        assert_eq!(destination("64"), Destination::Command("64"));
        assert_eq!(destination("-script 10 c"), Destination::Command("-script 10 c"));
        assert_eq!(destination("-print false"), Destination::Command("-print false"));
        assert_eq!(destination("  "), Destination::Nothing);
    }
}
