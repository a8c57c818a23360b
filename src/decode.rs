// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Instruction decoding
//!
//! Given a 5 digit number, digits ABCDE are used as follows:
//! DE is the two-digit opcode
//! C is the 1st parameter's mode
//! B is the 2nd parameter's mode
//! A is the 3rd parameter's mode
//!
//! So `01202` would be decoded as follows:
//!
//! Opcode 02 is multiply
//! C=2: 1st parameter is in relative mode
//! B=1: 2nd parameter is in immediate mode
//! A=0: 3rd parameter is in positional mode
//!
//! Missing leading digits are zeroes, so any parameter without an explicit mode digit is
//! positional.

use std::fmt::{self, Display};

use crate::error::Fault;
use crate::memory::Memory;

/// Parameter mode for Intcode instruction
///
/// Intcode instruction parameters each have a mode:  [positional], [immediate], or [relative].
///
/// When executing an intcode instruction, the instruction's parameters are interpreted in
/// accordance with their associated modes.
///
/// [positional]: ParamMode::Positional
/// [immediate]: ParamMode::Immediate
/// [relative]: ParamMode::Relative
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum ParamMode {
    /// Positional Mode
    ///
    /// A parameter in positional mode evaluates to the value at the address specified by the
    /// parameter.
    #[default]
    Positional = 0,
    /// Immediate Mode
    ///
    /// A parameter in immediate mode evaluates directly to the value specified. Instructions which
    /// write to memory may not use immediate mode for their destinations.
    #[doc(alias = "#")]
    Immediate = 1,
    /// Relative Mode
    ///
    /// A parameter in relative mode evaluates to the value at the address specified by the
    /// parameter, added to the relative base, which starts out as `0` but can be modified
    /// throughout the program's execution.
    #[doc(alias = "@")]
    Relative = 2,
}

impl Display for ParamMode {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamMode::Positional => Ok(()),
            ParamMode::Immediate => write!(fmt, "#"),
            ParamMode::Relative => write!(fmt, "@"),
        }
    }
}

impl TryFrom<i64> for ParamMode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(ParamMode::Positional),
            1 => Ok(ParamMode::Immediate),
            2 => Ok(ParamMode::Relative),
            _ => Err(i),
        }
    }
}

/// The operation selected by the low two digits of an instruction
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(missing_docs, reason = "trivial")]
pub enum OpCode {
    Add = 1,
    Mul = 2,
    In = 3,
    Out = 4,
    Jnz = 5,
    Jz = 6,
    Lt = 7,
    Eq = 8,
    Rbo = 9,
    Halt = 99,
}

impl OpCode {
    /// Number of parameters following the opcode
    pub const fn arity(self) -> usize {
        match self {
            OpCode::Add | OpCode::Mul | OpCode::Lt | OpCode::Eq => 3,
            OpCode::Jnz | OpCode::Jz => 2,
            OpCode::In | OpCode::Out | OpCode::Rbo => 1,
            OpCode::Halt => 0,
        }
    }

    /// Assembly-style mnemonic
    pub const fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Add => "ADD",
            OpCode::Mul => "MUL",
            OpCode::In => "IN",
            OpCode::Out => "OUT",
            OpCode::Jnz => "JNZ",
            OpCode::Jz => "JZ",
            OpCode::Lt => "LT",
            OpCode::Eq => "EQ",
            OpCode::Rbo => "RBO",
            OpCode::Halt => "HALT",
        }
    }
}

impl TryFrom<i64> for OpCode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            1 => Ok(OpCode::Add),
            2 => Ok(OpCode::Mul),
            3 => Ok(OpCode::In),
            4 => Ok(OpCode::Out),
            5 => Ok(OpCode::Jnz),
            6 => Ok(OpCode::Jz),
            7 => Ok(OpCode::Lt),
            8 => Ok(OpCode::Eq),
            9 => Ok(OpCode::Rbo),
            99 => Ok(OpCode::Halt),
            _ => Err(i),
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A single decoded parameter: the raw int that followed the opcode, and its mode
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Param {
    /// The parameter exactly as stored in memory
    pub raw: i64,
    /// How `raw` is to be interpreted
    pub mode: ParamMode,
}

impl Param {
    /// Effective address given the relative base, or [None] for immediate parameters
    pub fn address(self, rel_base: i64) -> Option<i64> {
        match self.mode {
            ParamMode::Positional => Some(self.raw),
            ParamMode::Immediate => None,
            // an address that doesn't fit is out of bounds either way
            ParamMode::Relative => Some(self.raw.saturating_add(rel_base)),
        }
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mode, self.raw)
    }
}

/// A decoded operation with its parameters
///
/// Write targets (the last parameter of [Add](Operation::Add), [Multiply](Operation::Multiply),
/// [LessThan](Operation::LessThan), [Equals](Operation::Equals), and the only parameter of
/// [Input](Operation::Input)) are guaranteed not to be in immediate mode.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(missing_docs, reason = "documented by OpCode")]
pub enum Operation {
    Add(Param, Param, Param),
    Multiply(Param, Param, Param),
    Input(Param),
    Output(Param),
    JumpIfTrue(Param, Param),
    JumpIfFalse(Param, Param),
    LessThan(Param, Param, Param),
    Equals(Param, Param, Param),
    AdjustRelativeBase(Param),
    Halt,
}

impl Operation {
    /// The [OpCode] this operation was decoded from
    pub const fn opcode(&self) -> OpCode {
        match self {
            Operation::Add(..) => OpCode::Add,
            Operation::Multiply(..) => OpCode::Mul,
            Operation::Input(_) => OpCode::In,
            Operation::Output(_) => OpCode::Out,
            Operation::JumpIfTrue(..) => OpCode::Jnz,
            Operation::JumpIfFalse(..) => OpCode::Jz,
            Operation::LessThan(..) => OpCode::Lt,
            Operation::Equals(..) => OpCode::Eq,
            Operation::AdjustRelativeBase(_) => OpCode::Rbo,
            Operation::Halt => OpCode::Halt,
        }
    }

    /// The parameters in order
    pub fn params(&self) -> Vec<Param> {
        match *self {
            Operation::Add(a, b, c)
            | Operation::Multiply(a, b, c)
            | Operation::LessThan(a, b, c)
            | Operation::Equals(a, b, c) => vec![a, b, c],
            Operation::JumpIfTrue(a, b) | Operation::JumpIfFalse(a, b) => vec![a, b],
            Operation::Input(a) | Operation::Output(a) | Operation::AdjustRelativeBase(a) => {
                vec![a]
            }
            Operation::Halt => Vec::new(),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode())?;
        for (i, param) in self.params().into_iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{param}")?;
        }
        Ok(())
    }
}

/// An [Operation] along with where it was found
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Instruction {
    /// Position of the opcode in memory
    pub ip: i64,
    /// The full opcode int, including mode digits
    pub word: i64,
    /// The decoded operation
    pub op: Operation,
}

impl Instruction {
    /// Number of memory cells the instruction occupies
    pub const fn width(&self) -> i64 {
        #[allow(clippy::cast_possible_wrap, reason = "arity is at most 3")]
        {
            self.op.opcode().arity() as i64 + 1
        }
    }

    /// Modes of the first three parameters, with unused parameters positional
    pub fn param_modes(&self) -> [ParamMode; 3] {
        let mut modes = [ParamMode::Positional; 3];
        for (mode, param) in modes.iter_mut().zip(self.op.params()) {
            *mode = param.mode;
        }
        modes
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.op, f)
    }
}

/// Reads the words of one instruction, advancing the instruction pointer as it goes
struct Decoder<'a> {
    memory: &'a Memory,
    ip: &'a mut i64,
    start: i64,
    rel_base: i64,
    mode_data: i64,
}

impl Decoder<'_> {
    fn next_word(&mut self) -> Result<i64, Fault> {
        let word = self.memory.get(*self.ip).ok_or(Fault::OutOfBounds {
            ip: *self.ip,
            len: self.memory.len(),
        })?;
        *self.ip += 1;
        Ok(word)
    }

    /// Read the `n`th (one-based) parameter, validating its mode and effective address
    fn param(&mut self, n: u32) -> Result<Param, Fault> {
        let raw = self.next_word()?;
        let digit = (self.mode_data / 10_i64.pow(n - 1)) % 10;
        let mode = ParamMode::try_from(digit).map_err(|mode| Fault::UnknownMode {
            ip: self.start,
            param: n as usize,
            mode,
        })?;
        let param = Param { raw, mode };
        match param.address(self.rel_base) {
            Some(address) if !self.memory.contains(address) => Err(Fault::InvalidAddress {
                ip: self.start,
                param: n as usize,
                raw,
                address,
            }),
            _ => Ok(param),
        }
    }

    /// Read the `n`th parameter, which will be written to
    fn dest(&mut self, n: u32) -> Result<Param, Fault> {
        let param = self.param(n)?;
        if param.mode == ParamMode::Immediate {
            return Err(Fault::WriteToImmediate {
                ip: self.start,
                param: n as usize,
                raw: param.raw,
            });
        }
        Ok(param)
    }
}

/// Decode the instruction at `*ip`, leaving `*ip` just past its last parameter
///
/// On failure, `*ip` is left wherever decoding stopped.
pub(crate) fn decode(memory: &Memory, ip: &mut i64, rel_base: i64) -> Result<Instruction, Fault> {
    let start = *ip;
    let mut decoder = Decoder {
        memory,
        ip,
        start,
        rel_base,
        mode_data: 0,
    };
    let word = decoder.next_word()?;
    decoder.mode_data = word / 100;
    let opcode = OpCode::try_from(word % 100)
        .map_err(|code| Fault::UnknownOpcode { code, ip: start })?;

    let d = &mut decoder;
    let op = match opcode {
        OpCode::Add => Operation::Add(d.param(1)?, d.param(2)?, d.dest(3)?),
        OpCode::Mul => Operation::Multiply(d.param(1)?, d.param(2)?, d.dest(3)?),
        OpCode::In => Operation::Input(d.dest(1)?),
        OpCode::Out => Operation::Output(d.param(1)?),
        OpCode::Jnz => Operation::JumpIfTrue(d.param(1)?, d.param(2)?),
        OpCode::Jz => Operation::JumpIfFalse(d.param(1)?, d.param(2)?),
        OpCode::Lt => Operation::LessThan(d.param(1)?, d.param(2)?, d.dest(3)?),
        OpCode::Eq => Operation::Equals(d.param(1)?, d.param(2)?, d.dest(3)?),
        OpCode::Rbo => Operation::AdjustRelativeBase(d.param(1)?),
        // mode digits on a halt have nothing to apply to, so they're ignored
        OpCode::Halt => Operation::Halt,
    };
    Ok(Instruction {
        ip: start,
        word,
        op,
    })
}
