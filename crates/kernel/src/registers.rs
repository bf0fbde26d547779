//! Register machine.
//!
//! 32 signed 32-bit registers named `R0`..`R31`, driven by the `-reg` command and read by the
//! conditional evaluator. All arithmetic wraps silently.

use crate::config::K_REGISTER_COUNT;
use crate::{KernelError, KernelResult};

/// Prefix of immediate operands.
pub const K_IMMEDIATE_PREFIX: char = '#';

/// A resolved operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Immediate(i32),
    Register(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOp {
    Mov,
    Xcg,
    Inc,
    Dec,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    Not,
    And,
    Ior,
    Xor,
    Max,
    Min,
}

const K_OPERATIONS: [(&str, RegisterOp); 16] = [
    ("MOV", RegisterOp::Mov),
    ("XCG", RegisterOp::Xcg),
    ("INC", RegisterOp::Inc),
    ("DEC", RegisterOp::Dec),
    ("ADD", RegisterOp::Add),
    ("SUB", RegisterOp::Sub),
    ("MUL", RegisterOp::Mul),
    ("DIV", RegisterOp::Div),
    ("REM", RegisterOp::Rem),
    ("NEG", RegisterOp::Neg),
    ("NOT", RegisterOp::Not),
    ("AND", RegisterOp::And),
    ("IOR", RegisterOp::Ior),
    ("XOR", RegisterOp::Xor),
    ("MAX", RegisterOp::Max),
    ("MIN", RegisterOp::Min),
];

impl RegisterOp {
    /// Looks an operation up by its mnemonic (case-insensitive).
    ///
    /// # Errors
    /// `KernelError::UnknownOperation` when the mnemonic is not supported.
    pub fn from_name(p_name: &str) -> KernelResult<RegisterOp> {
        K_OPERATIONS
            .iter()
            .find(|(l_name, _)| l_name.eq_ignore_ascii_case(p_name))
            .map(|(_, l_op)| *l_op)
            .ok_or_else(|| KernelError::unknown_operation(p_name))
    }

    /// True for the operations reading only `dest`.
    pub fn is_in_place(&self) -> bool {
        matches!(self, RegisterOp::Inc | RegisterOp::Dec)
    }
}

/// Parses a register name: `R<n>`, or bare digits which are expanded to `R<n>`.
///
/// # Returns
/// The register index, or `None` when the name does not designate one of the 32 registers.
pub fn parse_register(p_name: &str) -> Option<usize> {
    let l_digits = p_name.strip_prefix('R').unwrap_or(p_name);
    if l_digits.is_empty() || !l_digits.bytes().all(|l_b| l_b.is_ascii_digit()) {
        return None;
    }
    l_digits
        .parse::<usize>()
        .ok()
        .filter(|l_idx| *l_idx < K_REGISTER_COUNT)
}

/// Parses an operand: `#<value>` is an immediate, anything else must name a register.
///
/// # Errors
/// `KernelError::RegisterError` for a malformed immediate or an unknown register name.
pub fn parse_operand(p_token: &str) -> KernelResult<Operand> {
    if let Some(l_value) = p_token.strip_prefix(K_IMMEDIATE_PREFIX) {
        l_value
            .parse::<i32>()
            .map(Operand::Immediate)
            .map_err(|_| KernelError::RegisterError("Invalid immediate value."))
    } else {
        parse_register(p_token)
            .map(Operand::Register)
            .ok_or(KernelError::RegisterError("Invalid register name."))
    }
}

pub struct RegisterFile {
    values: [i32; K_REGISTER_COUNT],
}

impl RegisterFile {
    pub const fn new() -> Self {
        Self {
            values: [0; K_REGISTER_COUNT],
        }
    }

    /// Value of a register, 0 for an index out of range.
    pub fn get(&self, p_index: usize) -> i32 {
        self.values.get(p_index).copied().unwrap_or(0)
    }

    pub fn set(&mut self, p_index: usize, p_value: i32) {
        if let Some(l_reg) = self.values.get_mut(p_index) {
            *l_reg = p_value;
        }
    }

    pub fn resolve(&self, p_operand: Operand) -> i32 {
        match p_operand {
            Operand::Immediate(l_value) => l_value,
            Operand::Register(l_index) => self.get(l_index),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.values.iter().copied().enumerate()
    }

    /// Executes one operation.
    ///
    /// # Parameters
    /// - `p_op`: the operation.
    /// - `p_dest`: destination register index.
    /// - `p_src1`: first source. Ignored by `INC`/`DEC`, required by every other operation.
    /// - `p_src2`: second source of binary operations, read as 0 when absent.
    ///
    /// # Returns
    /// The new value of `p_dest`.
    ///
    /// # Errors
    /// - `KernelError::RegisterError` when a required operand is missing, or when `XCG` is given
    ///   an immediate source.
    /// - `KernelError::DivisionByZero` for `DIV`/`REM` with a zero divisor.
    ///
    /// On error no register is modified.
    pub fn execute(
        &mut self,
        p_op: RegisterOp,
        p_dest: usize,
        p_src1: Option<Operand>,
        p_src2: Option<Operand>,
    ) -> KernelResult<i32> {
        if p_dest >= K_REGISTER_COUNT {
            return Err(KernelError::RegisterError("Invalid register name."));
        }
        let l_dest = self.get(p_dest);

        if p_op.is_in_place() {
            let l_result = match p_op {
                RegisterOp::Inc => l_dest.wrapping_add(1),
                _ => l_dest.wrapping_sub(1),
            };
            self.set(p_dest, l_result);
            return Ok(l_result);
        }

        let l_src1 = p_src1.ok_or(KernelError::RegisterError("Missing source operand."))?;
        let l_a = self.resolve(l_src1);
        let l_b = p_src2.map(|l_op| self.resolve(l_op)).unwrap_or(0);

        let l_result = match p_op {
            RegisterOp::Mov => l_a,
            RegisterOp::Xcg => {
                let Operand::Register(l_src_index) = l_src1 else {
                    return Err(KernelError::RegisterError("XCG needs a register source."));
                };
                self.set(l_src_index, l_dest);
                l_a
            }
            RegisterOp::Add => l_a.wrapping_add(l_b),
            RegisterOp::Sub => l_a.wrapping_sub(l_b),
            RegisterOp::Mul => l_a.wrapping_mul(l_b),
            RegisterOp::Div | RegisterOp::Rem if l_b == 0 => {
                return Err(KernelError::DivisionByZero);
            }
            RegisterOp::Div => l_a.wrapping_div(l_b),
            RegisterOp::Rem => l_a.wrapping_rem(l_b),
            RegisterOp::Neg => l_a.wrapping_neg(),
            RegisterOp::Not => !l_a,
            RegisterOp::And => l_a & l_b,
            RegisterOp::Ior => l_a | l_b,
            RegisterOp::Xor => l_a ^ l_b,
            RegisterOp::Max => l_a.max(l_b),
            RegisterOp::Min => l_a.min(l_b),
            RegisterOp::Inc | RegisterOp::Dec => l_dest,
        };
        self.set(p_dest, l_result);
        Ok(l_result)
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
