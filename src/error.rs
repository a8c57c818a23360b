// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Error types for loading programs, running machines, and orchestrating networks

use std::io;
use std::num::ParseIntError;

use thiserror::Error;

/// A program's text could not be turned into a memory image
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A comma-separated token was not a base-10 `i64`
    #[error("token {index} ({token:?}) is not a valid integer: {source}")]
    InvalidToken {
        /// zero-based position of the token within the program text
        index: usize,
        /// the offending token, trimmed
        token: String,
        /// why it failed to parse
        source: ParseIntError,
    },
    /// The program text contained no tokens at all
    #[error("program text is empty")]
    Empty,
}

/// A fatal error encountered by a running [Machine]
///
/// Every variant carries `ip`, the position of the instruction that faulted (or, for
/// [Fault::OutOfBounds], the offending value of the instruction pointer itself).
///
/// [Machine]: crate::Machine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The instruction pointer does not reference a valid memory cell
    #[error("instruction pointer {ip} is outside of memory (length {len})")]
    OutOfBounds {
        /// the instruction pointer
        ip: i64,
        /// the length of memory at the time
        len: usize,
    },
    /// A parameter's effective address is outside of memory
    #[error(
        "parameter {param} of instruction at {ip} (raw value {raw}) refers to address {address}, \
         which is out of bounds"
    )]
    InvalidAddress {
        /// position of the instruction
        ip: i64,
        /// one-based parameter index
        param: usize,
        /// the parameter exactly as stored in memory
        raw: i64,
        /// the address it resolved to
        address: i64,
    },
    /// The low two digits of the instruction are not a known opcode
    #[error("unknown opcode {code} at position {ip}")]
    UnknownOpcode {
        /// the two-digit opcode
        code: i64,
        /// position of the instruction
        ip: i64,
    },
    /// A mode digit is not 0, 1, or 2
    #[error("unknown mode {mode} for parameter {param} of instruction at {ip}")]
    UnknownMode {
        /// position of the instruction
        ip: i64,
        /// one-based parameter index
        param: usize,
        /// the mode digit
        mode: i64,
    },
    /// A write target was given in immediate mode
    #[error("parameter {param} of instruction at {ip} is an immediate write target ({raw})")]
    WriteToImmediate {
        /// position of the instruction
        ip: i64,
        /// one-based parameter index
        param: usize,
        /// the raw parameter
        raw: i64,
    },
    /// An input instruction was executed on a machine with no input source
    #[error("instruction at {ip} needs input, but the machine has no input source")]
    NoInputSource {
        /// position of the instruction
        ip: i64,
    },
    /// The input source ran dry or was closed with nothing left to read
    #[error("instruction at {ip} needs input, but no input is available")]
    InputExhausted {
        /// position of the instruction
        ip: i64,
    },
    /// A line read from a line-oriented input source was not an integer
    #[error("input {line:?} for instruction at {ip} is not a valid integer: {source}")]
    InputParse {
        /// position of the instruction
        ip: i64,
        /// the line that was read, without its line terminator
        line: String,
        /// why it failed to parse
        source: ParseIntError,
    },
    /// Reading from a line-oriented input source failed
    #[error("reading input for instruction at {ip} failed: {kind}")]
    InputRead {
        /// position of the instruction
        ip: i64,
        /// the kind of I/O error
        kind: io::ErrorKind,
    },
    /// The outbound channel has no receivers left
    #[error("instruction at {ip} could not send {value}: output channel is closed")]
    OutputClosed {
        /// position of the instruction
        ip: i64,
        /// the value that could not be sent
        value: i64,
    },
    /// An arithmetic result or the relative base does not fit in an `i64`
    #[error("arithmetic overflow in instruction at {ip}")]
    Overflow {
        /// position of the instruction
        ip: i64,
    },
}

impl Fault {
    /// The instruction pointer associated with the fault
    pub fn ip(&self) -> i64 {
        match *self {
            Self::OutOfBounds { ip, .. }
            | Self::InvalidAddress { ip, .. }
            | Self::UnknownOpcode { ip, .. }
            | Self::UnknownMode { ip, .. }
            | Self::WriteToImmediate { ip, .. }
            | Self::NoInputSource { ip }
            | Self::InputExhausted { ip }
            | Self::InputParse { ip, .. }
            | Self::InputRead { ip, .. }
            | Self::OutputClosed { ip, .. }
            | Self::Overflow { ip } => ip,
        }
    }
}

/// An error orchestrating a [Network] or an [Interactive] session
///
/// [Network]: crate::network::Network
/// [Interactive]: crate::interactive::Interactive
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// `load_phases` was given the wrong number of values
    #[error("expected {expected} phase values, got {got}")]
    PhaseCount {
        /// number of machines in the network
        expected: usize,
        /// number of values provided
        got: usize,
    },
    /// `load_phases` was called more than once
    #[error("phases have already been loaded")]
    PhasesAlreadyLoaded,
    /// The machines were already started
    #[error("network is already running")]
    AlreadyRunning,
    /// A feedback ring was configured with rendezvous channels, which leave the final output of
    /// the ring nowhere to go
    #[error("a feedback ring needs channels that can hold at least one value")]
    RendezvousRing,
    /// The machines were never started, or have already been joined
    #[error("network is not running")]
    NotRunning,
    /// Every machine reading the network's input channel is gone
    #[error("input channel is closed")]
    InputClosed,
    /// The network's output channel is closed and drained
    #[error("output channel is closed")]
    OutputClosed,
    /// A machine's thread panicked
    #[error("thread for machine {label:?} panicked")]
    Panicked {
        /// the machine's label
        label: String,
    },
    /// A machine stopped with a fault
    #[error("machine {label:?} faulted: {source}")]
    Faulted {
        /// the machine's label
        label: String,
        /// the fault
        source: Fault,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_ip() {
        assert_eq!(Fault::OutOfBounds { ip: 12, len: 4 }.ip(), 12);
        assert_eq!(Fault::NoInputSource { ip: 3 }.ip(), 3);
        assert_eq!(Fault::OutputClosed { ip: 7, value: 1 }.ip(), 7);
    }

    #[test]
    fn messages_identify_the_failure() {
        let fault = Fault::InvalidAddress {
            ip: 4,
            param: 2,
            raw: 90,
            address: 95,
        };
        let msg = fault.to_string();
        assert!(msg.contains("parameter 2"), "{msg}");
        assert!(msg.contains("at 4"), "{msg}");
        assert!(msg.contains("95"), "{msg}");
        assert_eq!(
            Fault::UnknownOpcode { code: 42, ip: 0 }.to_string(),
            "unknown opcode 42 at position 0"
        );
    }
}
