// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Where a machine's input comes from, and the channels its output goes to

use std::collections::VecDeque;
use std::fmt;
use std::io::BufRead;

pub use crossbeam_channel::{Receiver, Sender};

use crate::error::Fault;

/// The source that [Input](crate::decode::Operation::Input) instructions read from
#[derive(Default)]
pub enum InputSource {
    /// No input is available; the first input instruction faults with
    /// [Fault::NoInputSource]
    #[default]
    None,
    /// Each input instruction consumes one line and parses it as a base-10 integer
    Lines(Box<dyn BufRead + Send>),
    /// Each input instruction blocks until a value arrives, or faults once every sender is gone
    Channel(Receiver<i64>),
    /// Values queued up ahead of time, consumed front to back
    Values(VecDeque<i64>),
}

impl InputSource {
    /// A line-oriented source
    pub fn lines(reader: impl BufRead + Send + 'static) -> Self {
        Self::Lines(Box::new(reader))
    }

    /// A channel source
    pub fn channel(receiver: Receiver<i64>) -> Self {
        Self::Channel(receiver)
    }

    /// A queue of preloaded values
    pub fn values(values: impl IntoIterator<Item = i64>) -> Self {
        Self::Values(values.into_iter().collect())
    }

    /// Whether this source could ever suspend the reading thread
    pub fn may_block(&self) -> bool {
        matches!(self, Self::Lines(_) | Self::Channel(_))
    }

    /// Get the next value for the input instruction at `ip`
    pub(crate) fn next_value(&mut self, ip: i64) -> Result<i64, Fault> {
        match self {
            Self::None => Err(Fault::NoInputSource { ip }),
            Self::Values(queue) => queue.pop_front().ok_or(Fault::InputExhausted { ip }),
            Self::Channel(rx) => rx.recv().map_err(|_| Fault::InputExhausted { ip }),
            Self::Lines(reader) => {
                let mut line = String::new();
                let read = reader
                    .read_line(&mut line)
                    .map_err(|e| Fault::InputRead { ip, kind: e.kind() })?;
                if read == 0 {
                    return Err(Fault::InputExhausted { ip });
                }
                let line = line.trim();
                line.parse().map_err(|source| Fault::InputParse {
                    ip,
                    line: line.to_owned(),
                    source,
                })
            }
        }
    }
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Lines(_) => write!(f, "Lines(..)"),
            Self::Channel(rx) => f.debug_tuple("Channel").field(&rx.len()).finish(),
            Self::Values(queue) => f.debug_tuple("Values").field(queue).finish(),
        }
    }
}

/// How much a channel between two machines can hold before the sender blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Every send waits for a matching receive
    Rendezvous,
    /// Sends only block once this many values are waiting
    Bounded(usize),
    /// Sends never block
    Unbounded,
}

impl Capacity {
    /// The default: a single slot, so an output can be handed off before its reader is ready
    pub const ONE_SLOT: Self = Self::Bounded(1);

    /// Create a channel with this capacity
    pub fn channel(self) -> (Sender<i64>, Receiver<i64>) {
        match self {
            Self::Rendezvous => crossbeam_channel::bounded(0),
            Self::Bounded(n) => crossbeam_channel::bounded(n),
            Self::Unbounded => crossbeam_channel::unbounded(),
        }
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::ONE_SLOT
    }
}
