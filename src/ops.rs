// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Executing decoded operations against a [Machine]

use crate::Machine;
use crate::decode::{Instruction, Operation, Param};
use crate::error::Fault;

/// What the execution loop should do after an operation has been applied
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Control {
    /// Decode and apply the next instruction
    Continue,
    /// A halt instruction was executed
    Halt,
}

impl Machine {
    /// Resolve a parameter to the value it refers to
    fn read(&self, ip: i64, n: usize, param: Param) -> Result<i64, Fault> {
        match param.address(self.rel_base) {
            None => Ok(param.raw),
            Some(address) => self.memory.get(address).ok_or(Fault::InvalidAddress {
                ip,
                param: n,
                raw: param.raw,
                address,
            }),
        }
    }

    /// Store `value` at the address a write parameter refers to
    fn write(&mut self, ip: i64, n: usize, param: Param, value: i64) -> Result<(), Fault> {
        let Some(address) = param.address(self.rel_base) else {
            return Err(Fault::WriteToImmediate {
                ip,
                param: n,
                raw: param.raw,
            });
        };
        let cell = self.memory.get_mut(address).ok_or(Fault::InvalidAddress {
            ip,
            param: n,
            raw: param.raw,
            address,
        })?;
        *cell = value;
        Ok(())
    }

    /// common logic of all 4 instructions that take 2 operands and store a result
    fn op3(
        &mut self,
        instr: &Instruction,
        (a, b, dest): (Param, Param, Param),
        operation: impl Fn(i64, i64) -> Option<i64>,
    ) -> Result<Control, Fault> {
        let ip = instr.ip;
        let x = self.read(ip, 1, a)?;
        let y = self.read(ip, 2, b)?;
        let val = operation(x, y).ok_or(Fault::Overflow { ip })?;
        self.write(ip, 3, dest, val)?;
        self.record(instr, self.rel_base, &[x, y], Some(val));
        Ok(Control::Continue)
    }

    fn jump(
        &mut self,
        instr: &Instruction,
        (cond, dest): (Param, Param),
        when: impl Fn(i64) -> bool,
    ) -> Result<Control, Fault> {
        let x = self.read(instr.ip, 1, cond)?;
        let target = self.read(instr.ip, 2, dest)?;
        if when(x) {
            // validated by the execution loop before the next decode
            self.ip = target;
        }
        self.record(instr, self.rel_base, &[x, target], None);
        Ok(Control::Continue)
    }
}

impl Operation {
    /// Apply the operation to `machine`
    ///
    /// `instr` must be the instruction this operation was decoded as part of, and the machine's
    /// instruction pointer must already point just past it.
    pub(crate) fn apply(self, machine: &mut Machine, instr: &Instruction) -> Result<Control, Fault> {
        let ip = instr.ip;
        match self {
            Operation::Add(a, b, dest) => machine.op3(instr, (a, b, dest), i64::checked_add),
            Operation::Multiply(a, b, dest) => machine.op3(instr, (a, b, dest), i64::checked_mul),
            Operation::LessThan(a, b, dest) => {
                machine.op3(instr, (a, b, dest), |x, y| Some(i64::from(x < y)))
            }
            Operation::Equals(a, b, dest) => {
                machine.op3(instr, (a, b, dest), |x, y| Some(i64::from(x == y)))
            }
            Operation::JumpIfTrue(cond, dest) => machine.jump(instr, (cond, dest), |x| x != 0),
            Operation::JumpIfFalse(cond, dest) => machine.jump(instr, (cond, dest), |x| x == 0),
            Operation::Input(dest) => {
                let value = machine.receive(ip)?;
                machine.write(ip, 1, dest, value)?;
                machine.record(instr, machine.rel_base, &[], Some(value));
                Ok(Control::Continue)
            }
            Operation::Output(src) => {
                let value = machine.read(ip, 1, src)?;
                machine.record(instr, machine.rel_base, &[value], None);
                machine.emit(ip, value)?;
                Ok(Control::Continue)
            }
            Operation::AdjustRelativeBase(shift) => {
                let shift_by = machine.read(ip, 1, shift)?;
                let old = machine.rel_base;
                machine.rel_base = old.checked_add(shift_by).ok_or(Fault::Overflow { ip })?;
                machine.record(instr, old, &[shift_by], None);
                Ok(Control::Continue)
            }
            Operation::Halt => {
                machine.record(instr, machine.rel_base, &[], None);
                Ok(Control::Halt)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn comparisons_store_one_or_zero() {
        let mut machine = Machine::new([1107, 1, 2, 5, 99, -1]);
        machine.run().unwrap();
        assert_eq!(machine[5], 1);
        let mut machine = Machine::new([1108, 1, 2, 5, 99, -1]);
        machine.run().unwrap();
        assert_eq!(machine[5], 0);
    }

    #[test]
    fn jumps_skip_their_parameters_when_not_taken() {
        // JZ #1, #999 falls through to OUT #3
        let mut machine = Machine::new([1106, 1, 999, 104, 3, 99]);
        assert_eq!(machine.run_with_inputs([]), Ok(vec![3]));
    }

    #[test]
    fn relative_base_shifts_accumulate() {
        let mut machine = Machine::new([109, 6, 109, -2, 204, 0, 99]);
        assert_eq!(machine.run_with_inputs([]), Ok(vec![204]));
        assert_eq!(machine.relative_base(), 4);
    }

    #[test]
    fn relative_write_target() {
        let mut machine = Machine::new([109, 7, 21101, 2, 3, 0, 99, 0]);
        machine.run().unwrap();
        assert_eq!(machine[7], 5);
    }

    #[test]
    fn overflow_is_a_fault() {
        let mut machine = Machine::new([1102, i64::MAX, 2, 0, 99]);
        assert_eq!(machine.run(), Err(Fault::Overflow { ip: 0 }));
        assert_eq!(machine.state(), &State::Faulted(Fault::Overflow { ip: 0 }));
    }
}
