// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD
#![warn(missing_docs)]

//! Library providing an Intcode virtual machine, and the plumbing to wire several of them together
//!
//! The machine is fully functional, with all of the [Opcodes] and [Parameter Modes] defined in
//! the completed Intcode computer for [Day 9].
//!
//! # Example
//!
//! ```rust
//! use intcode::prelude::*;
//! let mut machine = Machine::new(vec![104, 1024, 99]);
//!
//! assert_eq!(machine.run_with_inputs(empty()), Ok(vec![1024]));
//! assert_eq!(machine.state(), &State::Halted);
//! ```
//!
//! Machines can read from and write to channels, which is how a [Network] of them is built:
//!
//! ```rust
//! use intcode::prelude::*;
//! // read a value, add one to it, write it back out
//! let program: Machine = "3,9,1001,9,1,9,4,9,99,0".parse().unwrap();
//! let mut chain = Network::pipeline(&program, ["a", "b", "c"]);
//! chain.run_async().unwrap();
//! chain.input(10).unwrap();
//! assert_eq!(chain.output(), Ok(13));
//! for done in chain.wait_for_completion().unwrap() {
//!     done.check().unwrap();
//! }
//! ```
//!
//! [Opcodes]: https://esolangs.org/wiki/Intcode#Opcodes
//! [Parameter Modes]: https://esolangs.org/wiki/Intcode#Parameter_Modes
//! [Day 9]: https://adventofcode.com/2019/day/9

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};

pub mod decode;
pub mod diagnostics;
pub mod error;
pub mod interactive;
pub mod io;
pub mod memory;
pub mod network;
mod ops;
pub mod trace;

pub use decode::{Instruction, OpCode, Operation, Param, ParamMode};
pub use error::{Fault, LoadError, NetworkError};
pub use ops::Control;

use diagnostics::Diagnostics;
use io::{InputSource, Sender};
use memory::Memory;
use trace::Trace;

/// A small module that re-exports items needed when working with Intcode machines
pub mod prelude {
    pub use crate::error::{Fault, LoadError, NetworkError};
    pub use crate::interactive::Interactive;
    pub use crate::io::{Capacity, InputSource};
    pub use crate::network::{Completion, Network, NetworkConfig, Topology};
    pub use crate::{Control, Machine, State};
    pub use std::iter::empty;
}

/// The label given to machines that weren't given one explicitly
pub const DEFAULT_LABEL: &str = "intcode";

/// The execution state of a [Machine]
///
/// [Running](State::Running) means there are more instructions to execute. The other two states
/// are terminal: once reached, no more instructions will be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Execution can continue
    Running,
    /// A `HALT` instruction has been executed
    Halted,
    /// Execution stopped because of a [Fault]
    Faulted(Fault),
}

impl State {
    /// Whether the machine has stopped for good
    pub fn is_terminal(&self) -> bool {
        !matches!(self, State::Running)
    }
}

/// An Intcode machine: memory, registers, and the I/O it's connected to
///
/// Cloning a machine deep-copies its memory and registers, but not its I/O connections, trace,
/// or collected outputs, and the clone starts out [Running](State::Running). This makes it cheap
/// to prepare a program once and run it many times with different inputs.
///
/// ```
/// use intcode::prelude::*;
/// let template = Machine::new([3, 0, 4, 0, 99]);
/// for i in -3..3 {
///     assert_eq!(template.clone().run_with_inputs([i]), Ok(vec![i]));
/// }
/// assert_eq!(template.state(), &State::Running);
/// ```
pub struct Machine {
    label: Arc<str>,
    memory: Memory,
    ip: i64,
    rel_base: i64,
    state: State,
    outputs: Vec<i64>,
    input: InputSource,
    output: Option<Sender<i64>>,
    trace: Option<Trace>,
    diagnostics: Option<Diagnostics>,
}

impl Machine {
    /// Create a new machine. Collects `code` into the starting memory state.
    pub fn new(code: impl IntoIterator<Item = i64>) -> Self {
        Self::from_memory(code.into_iter().collect())
    }

    /// Create a new machine with `memory` as its starting memory state
    pub fn from_memory(memory: Memory) -> Self {
        Self {
            label: Arc::from(DEFAULT_LABEL),
            memory,
            ip: 0,
            rel_base: 0,
            state: State::Running,
            outputs: Vec::new(),
            input: InputSource::None,
            output: None,
            trace: None,
            diagnostics: None,
        }
    }

    /// Parse comma-separated program text into a new machine
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        text.parse::<Memory>().map(Self::from_memory)
    }

    /// Set the label used in logs and diagnostics
    #[must_use]
    pub fn with_label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Zero-pad memory to at least `size` cells, as scratch space for the program
    #[must_use]
    pub fn with_memory_size(mut self, size: usize) -> Self {
        self.memory.reserve_scratch(size);
        self
    }

    /// Set where input instructions read from
    #[must_use]
    pub fn with_input(mut self, input: InputSource) -> Self {
        self.input = input;
        self
    }

    /// Send every output value over `output`, in addition to collecting it
    #[must_use]
    pub fn with_output(mut self, output: Sender<i64>) -> Self {
        self.output = Some(output);
        self
    }

    /// Attach a diagnostic transcript sink
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Replace the input source, returning the old one
    pub fn set_input(&mut self, input: InputSource) -> InputSource {
        std::mem::replace(&mut self.input, input)
    }

    /// Replace the output channel, returning the old one
    pub fn set_output(&mut self, output: Option<Sender<i64>>) -> Option<Sender<i64>> {
        std::mem::replace(&mut self.output, output)
    }

    /// The machine's label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The current execution state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Whether a `HALT` instruction has been executed
    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// The position of the next instruction to execute
    pub fn instruction_pointer(&self) -> i64 {
        self.ip
    }

    /// The current relative base
    pub fn relative_base(&self) -> i64 {
        self.rel_base
    }

    /// The machine's memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Render memory as comma-separated integers
    pub fn dump_memory(&self) -> String {
        self.memory.dump()
    }

    /// Get the memory at `address`, if it's in bounds
    #[doc(alias = "peek")]
    pub fn mem_get(&self, address: i64) -> Option<i64> {
        self.memory.get(address)
    }

    /// Manually set a memory location, returning the value it replaced, or [None] if `address`
    /// is out of bounds (in which case memory is unchanged)
    #[doc(alias("poke", "write"))]
    pub fn mem_set(&mut self, address: i64, value: i64) -> Option<i64> {
        self.memory
            .get_mut(address)
            .map(|cell| std::mem::replace(cell, value))
    }

    /// Every value output so far
    pub fn outputs(&self) -> &[i64] {
        &self.outputs
    }

    /// Take every value output so far, leaving the log empty
    pub fn take_outputs(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.outputs)
    }

    /// Decode the next instruction without executing it
    pub fn next_instruction(&self) -> Result<Instruction, Fault> {
        let mut ip = self.ip;
        decode::decode(&self.memory, &mut ip, self.rel_base)
    }

    /// Decode and apply a single instruction
    ///
    /// Once the machine is in a terminal state this does nothing: a halted machine returns
    /// `Ok(Control::Halt)` and a faulted one returns its fault again.
    pub fn step(&mut self) -> Result<Control, Fault> {
        match &self.state {
            State::Running => (),
            State::Halted => return Ok(Control::Halt),
            State::Faulted(fault) => return Err(fault.clone()),
        }
        match self.execute() {
            Ok(Control::Continue) => Ok(Control::Continue),
            Ok(Control::Halt) => {
                self.halt();
                Ok(Control::Halt)
            }
            Err(fault) => {
                self.fault(&fault);
                Err(fault)
            }
        }
    }

    /// Execute until the program halts or faults
    ///
    /// Input and output instructions may block, depending on the machine's [InputSource] and
    /// output channel. When execution stops either way, the output channel is closed so that
    /// whatever reads from it sees the end of the stream instead of waiting forever.
    #[instrument(level = "debug", skip(self), fields(machine = %self.label))]
    pub fn run(&mut self) -> Result<(), Fault> {
        loop {
            if self.step()? == Control::Halt {
                return Ok(());
            }
        }
    }

    /// Replace the input source with `inputs`, run until the program halts or faults, and return
    /// the values output during this run.
    ///
    /// If the program asks for more input than was provided, that's
    /// [Fault::InputExhausted].
    pub fn run_with_inputs(
        &mut self,
        inputs: impl IntoIterator<Item = i64>,
    ) -> Result<Vec<i64>, Fault> {
        self.input = InputSource::values(inputs);
        let already = self.outputs.len();
        self.run()?;
        Ok(self.outputs[already..].to_vec())
    }

    fn execute(&mut self) -> Result<Control, Fault> {
        if !self.memory.contains(self.ip) {
            return Err(Fault::OutOfBounds {
                ip: self.ip,
                len: self.memory.len(),
            });
        }
        let mut ip = self.ip;
        let instr = decode::decode(&self.memory, &mut ip, self.rel_base)?;
        trace!(machine = %self.label, ip = instr.ip, word = instr.word, "{instr}");
        if let Some(diag) = &self.diagnostics {
            diag.instruction(&self.label, &instr, self.rel_base);
        }
        self.ip = ip;
        let result = instr.op.apply(self, &instr);
        if result.is_err() {
            // leave the pointer on the instruction that faulted
            self.ip = instr.ip;
        }
        result
    }

    /// Read a value for the input instruction at `ip`
    pub(crate) fn receive(&mut self, ip: i64) -> Result<i64, Fault> {
        if self.input.may_block() {
            debug!(machine = %self.label, ip, "waiting for input");
            if let (Some(diag), InputSource::Lines(_)) = (&self.diagnostics, &self.input) {
                diag.prompt(&self.label);
            }
        }
        let value = self.input.next_value(ip)?;
        if let Some(diag) = &self.diagnostics {
            diag.input(&self.label, value);
        }
        Ok(value)
    }

    /// Log and send a value for the output instruction at `ip`
    pub(crate) fn emit(&mut self, ip: i64, value: i64) -> Result<(), Fault> {
        self.outputs.push(value);
        if let Some(diag) = &self.diagnostics {
            diag.output(&self.label, value);
        }
        if let Some(tx) = &self.output {
            debug!(machine = %self.label, ip, value, "sending output");
            tx.send(value)
                .map_err(|_| Fault::OutputClosed { ip, value })?;
        }
        Ok(())
    }

    /// Disconnect from both channels, so neighbors see this machine is gone
    fn disconnect(&mut self) {
        if matches!(self.input, InputSource::Channel(_)) {
            self.input = InputSource::None;
        }
        self.output = None;
    }

    fn halt(&mut self) {
        self.state = State::Halted;
        self.disconnect();
        debug!(machine = %self.label, ip = self.ip, outputs = self.outputs.len(), "halted");
        if let Some(diag) = &self.diagnostics {
            diag.halt(&self.label);
        }
    }

    fn fault(&mut self, fault: &Fault) {
        self.state = State::Faulted(fault.clone());
        self.disconnect();
        warn!(machine = %self.label, %fault, "machine faulted");
        if let Some(diag) = &self.diagnostics {
            diag.fault(&self.label, fault);
        }
    }
}

impl Clone for Machine {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            memory: self.memory.clone(),
            ip: self.ip,
            rel_base: self.rel_base,
            state: State::Running,
            outputs: Vec::new(),
            input: InputSource::None,
            output: None,
            trace: None,
            diagnostics: self.diagnostics.clone(),
        }
    }
}

// ignore I/O, traces and diagnostics
impl PartialEq for Machine {
    fn eq(&self, other: &Self) -> bool {
        self.ip == other.ip
            && self.rel_base == other.rel_base
            && self.state == other.state
            && self.memory == other.memory
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Machine")
            .field("label", &self.label)
            .field("state", &self.state)
            .field("ip", &self.ip)
            .field("rbo", &self.rel_base)
            .field("memory", &self.memory)
            .field("input", &self.input)
            .field("output", &self.output.is_some())
            .finish_non_exhaustive()
    }
}

impl FromStr for Machine {
    type Err = LoadError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Panics if `i` is out of bounds. Use [`Machine::mem_get`] for a checked read.
impl Index<i64> for Machine {
    type Output = i64;

    fn index(&self, i: i64) -> &Self::Output {
        self.memory.index(i)
    }
}

/// Panics if `i` is out of bounds. Use [`Machine::mem_set`] for a checked write.
impl IndexMut<i64> for Machine {
    fn index_mut(&mut self, i: i64) -> &mut Self::Output {
        self.memory.index_mut(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn running_off_the_end_faults() {
        let mut machine = Machine::new([1101, 1, 1, 0]);
        assert_eq!(machine.run(), Err(Fault::OutOfBounds { ip: 4, len: 4 }));
        assert_eq!(
            machine.state(),
            &State::Faulted(Fault::OutOfBounds { ip: 4, len: 4 })
        );
        // the fault sticks
        assert_eq!(machine.step(), Err(Fault::OutOfBounds { ip: 4, len: 4 }));
        assert_eq!(machine[0], 2);
    }

    #[test]
    fn jumping_outside_memory_faults() {
        let mut machine = Machine::new([1105, 1, -7]);
        assert_eq!(machine.run(), Err(Fault::OutOfBounds { ip: -7, len: 3 }));
    }

    #[test]
    fn input_without_a_source() {
        let mut machine = Machine::new([3, 0, 99]);
        assert_eq!(machine.run(), Err(Fault::NoInputSource { ip: 0 }));
    }

    #[test]
    fn missing_input_is_exhaustion() {
        let mut machine = Machine::new([3, 5, 3, 5, 99, 0]);
        assert_eq!(
            machine.run_with_inputs([1]),
            Err(Fault::InputExhausted { ip: 2 })
        );
        assert_eq!(machine.instruction_pointer(), 2);
    }

    #[test]
    fn halted_machine_stays_halted() {
        let mut machine = Machine::new([104, 1, 99]);
        machine.run().unwrap();
        assert!(machine.is_halted());
        assert_eq!(machine.step(), Ok(Control::Halt));
        assert_eq!(machine.outputs(), &[1]);
        assert_eq!(machine.take_outputs(), vec![1]);
        assert!(machine.outputs().is_empty());
    }

    #[test]
    fn output_channel_closes_on_halt() {
        let (tx, rx) = crate::io::Capacity::Unbounded.channel();
        let mut machine = Machine::new([104, 1, 104, 2, 99]).with_output(tx);
        machine.run().unwrap();
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn output_channel_closes_on_fault() {
        let (tx, rx) = crate::io::Capacity::Unbounded.channel();
        let mut machine = Machine::new([104, 1, 42]).with_output(tx);
        assert_eq!(machine.run(), Err(Fault::UnknownOpcode { code: 42, ip: 2 }));
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn send_to_closed_channel_faults() {
        let (tx, rx) = crate::io::Capacity::Unbounded.channel();
        drop(rx);
        let mut machine = Machine::new([104, 1, 99]).with_output(tx);
        assert_eq!(machine.run(), Err(Fault::OutputClosed { ip: 0, value: 1 }));
        // the value was still logged
        assert_eq!(machine.outputs(), &[1]);
    }

    #[test]
    fn next_instruction_does_not_execute() {
        let machine = Machine::new([1001, 0, 200, 0, 99]);
        let instr = machine.next_instruction().unwrap();
        assert_eq!(instr.to_string(), "ADD 0, #200, 0");
        assert_eq!(machine.instruction_pointer(), 0);
        assert_eq!(machine[0], 1001);
    }

    #[test]
    fn mem_set_is_checked() {
        let mut machine = Machine::new([1, 2, 3]);
        assert_eq!(machine.mem_set(1, 20), Some(2));
        assert_eq!(machine.mem_set(3, 20), None);
        assert_eq!(machine.mem_get(1), Some(20));
        assert_eq!(machine.mem_get(-1), None);
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(
            "1,2,three".parse::<Machine>(),
            Err(LoadError::InvalidToken { index: 2, .. })
        ));
    }

    #[test]
    fn clone_is_fresh() {
        let mut machine = Machine::new([104, 5, 99]).with_label("orig");
        machine.run().unwrap();
        let copy = machine.clone();
        assert_eq!(copy.state(), &State::Running);
        assert!(copy.outputs().is_empty());
        assert_eq!(copy.label(), "orig");
        assert_eq!(copy.instruction_pointer(), machine.instruction_pointer());
    }

    proptest! {
        #[test]
        fn clone_does_not_alias_memory(
            cells in prop::collection::vec(any::<i64>(), 1..32),
            addr in any::<prop::sample::Index>(),
            value in any::<i64>(),
        ) {
            let original = Machine::new(cells.clone());
            let mut copy = original.clone();
            #[allow(clippy::cast_possible_wrap, reason = "small index")]
            let addr = addr.index(cells.len()) as i64;
            copy.mem_set(addr, value);
            prop_assert_eq!(original.memory().as_slice(), cells.as_slice());
            prop_assert_eq!(copy.mem_get(addr), Some(value));
        }
    }
}
