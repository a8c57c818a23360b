// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Opt-in recording of every instruction a [Machine] executes

use std::fmt::{self, Debug, Display};

use super::Machine;
use super::decode::{Instruction, OpCode, Operation, ParamMode};

#[derive(Clone, Copy, PartialEq, Eq)]
/// Information about an instruction that was executed, which can be queried with its various
/// methods, or converted into a [String] using its [Display] impl.
pub struct TracedInstr {
    instr: Instruction,
    rel_base: i64,
    resolved: [Option<i64>; 3],
    stored_val: Option<i64>,
}

impl TracedInstr {
    /// Return the relative base at the time the traced instruction was executed
    pub fn rel_base(&self) -> i64 {
        self.rel_base
    }

    /// Return the instruction pointer's position when the traced instruction was executed
    pub fn instr_ptr(&self) -> i64 {
        self.instr.ip
    }

    /// Return the actual integer of the traced instruction
    pub fn op_int(&self) -> i64 {
        self.instr.word
    }

    /// Return the opcode of the traced instruction
    pub fn op_code(&self) -> OpCode {
        self.instr.op.opcode()
    }

    /// Return the decoded instruction
    pub fn instruction(&self) -> &Instruction {
        &self.instr
    }

    /// If the instruction stored a value, return that value
    pub fn stored_val(&self) -> Option<i64> {
        self.stored_val
    }

    /// The value the `n`th (zero-based) read parameter resolved to, if any
    pub fn resolved(&self, n: usize) -> Option<i64> {
        self.resolved.get(n).copied().flatten()
    }

    /// Return an array of the parameter modes of the traced instruction
    pub fn param_modes(&self) -> [ParamMode; 3] {
        self.instr.param_modes()
    }
}

impl Machine {
    /// Begin a [Trace] of executed instructions. If a trace is already running, this replaces that
    /// trace and returns it in a [`Some`], otherwise, it returns [`None`].
    ///
    /// # Example
    /// ```
    /// # use intcode::prelude::*;
    /// let mut machine = Machine::new([1101, 90, 9, 4, 99]);
    /// machine.start_trace();
    /// machine.run().unwrap();
    /// let trace = machine.end_trace().unwrap();
    /// assert_eq!(trace.0.len(), 2);
    /// assert_eq!(trace.0[0].stored_val(), Some(99));
    /// ```
    pub fn start_trace(&mut self) -> Option<Trace> {
        self.trace.replace(Trace::new())
    }

    /// Stop tracing executed instructions into a [Trace]. If no trace was active, returns [`None`]
    ///
    /// see [Machine::start_trace]
    pub fn end_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    /// Get a view of the current trace
    pub fn show_trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    /// Record `instr` into the active trace, if there is one
    pub(crate) fn record(
        &mut self,
        instr: &Instruction,
        rel_base: i64,
        resolved: &[i64],
        stored_val: Option<i64>,
    ) {
        if let Some(trace) = self.trace.as_mut() {
            let mut packed = [None; 3];
            for (slot, &val) in packed.iter_mut().zip(resolved) {
                *slot = Some(val);
            }
            trace.0.push(TracedInstr {
                instr: *instr,
                rel_base,
                resolved: packed,
                stored_val,
            });
        }
    }
}

#[derive(Debug, Default, Clone)]
/// A log of instructions that a [Machine] has executed since a call to
/// [Machine::start_trace]
///
/// see [Machine::start_trace]
pub struct Trace(pub Vec<TracedInstr>);

impl Trace {
    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }
}

impl Debug for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedInstr")
            .field("instr", &self.instr)
            .field("rel_base", &self.rel_base)
            .field("resolved", &self.resolved)
            .field("stored_val", &self.stored_val)
            .finish()
    }
}

impl Display for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ran instruction at {:0>4}: op int {: <5} | ",
            self.instr.ip, self.instr.word
        )?;
        let resolved = |n: usize| self.resolved(n).unwrap_or_default();
        match self.instr.op {
            Operation::Add(a, b, dest)
            | Operation::Multiply(a, b, dest)
            | Operation::LessThan(a, b, dest)
            | Operation::Equals(a, b, dest) => write!(
                f,
                "[{} {a} (resolves to {}), {b} (resolves to {}), {dest} (stored {})]",
                self.op_code(),
                resolved(0),
                resolved(1),
                self.stored_val.unwrap_or_default(),
            ),
            Operation::JumpIfTrue(cond, dest) | Operation::JumpIfFalse(cond, dest) => {
                let jumped = (resolved(0) != 0) == (self.op_code() == OpCode::Jnz);
                write!(
                    f,
                    "[{} {cond} (resolves to {}), {dest} ({} to {})]",
                    self.op_code(),
                    resolved(0),
                    if jumped { "jumped" } else { "didn't jump" },
                    resolved(1),
                )
            }
            Operation::Input(p) => write!(
                f,
                "[IN {p} (stored {})]",
                self.stored_val.unwrap_or_default()
            ),
            Operation::Output(p) => write!(f, "[OUT {p} (resolves to {})]", resolved(0)),
            Operation::AdjustRelativeBase(p) => write!(
                f,
                "[RBO {p} (resolved to {}) (went from {} to {})]",
                resolved(0),
                self.rel_base,
                self.rel_base.saturating_add(resolved(0)),
            ),
            Operation::Halt => write!(f, "[HALT]"),
        }
    }
}
