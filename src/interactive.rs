// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Driving a single machine from the calling thread, one value at a time

use std::sync::Arc;

use crate::Machine;
use crate::error::NetworkError;
use crate::io::{Capacity, InputSource, Receiver, Sender};
use crate::network::{self, Completion};

/// A machine running on its own thread, connected to the caller by a pair of channels
///
/// This is for programs that work in request/response fashion: the caller sends a value, then
/// waits for the program's answer before deciding what to send next.
///
/// # Example
///
/// ```
/// use intcode::prelude::*;
/// // doubles every input, forever
/// let doubler: Machine = "3,9,1002,9,2,9,4,9,1105,1,0,0".parse().unwrap();
/// let mut session = Interactive::spawn(doubler);
/// assert_eq!(session.request(21), Ok(42));
/// assert_eq!(session.request(-4), Ok(-8));
/// let done = session.finish().unwrap();
/// // closing the input is how the session ends, so the machine stops with no input left
/// assert!(matches!(done.result, Err(Fault::InputExhausted { .. })));
/// ```
#[derive(Debug)]
pub struct Interactive {
    label: Arc<str>,
    input: Option<Sender<i64>>,
    output: Receiver<i64>,
    handle: network::RunHandle,
}

impl Interactive {
    /// Start `machine` with rendezvous channels in both directions
    pub fn spawn(machine: Machine) -> Self {
        Self::spawn_with(machine, Capacity::Rendezvous)
    }

    /// Start `machine` with channels of the given capacity
    ///
    /// Any input source or output channel `machine` already had is replaced.
    pub fn spawn_with(machine: Machine, capacity: Capacity) -> Self {
        let (in_tx, in_rx) = capacity.channel();
        let (out_tx, out_rx) = capacity.channel();
        let machine = machine
            .with_input(InputSource::channel(in_rx))
            .with_output(out_tx);
        let label: Arc<str> = Arc::from(machine.label());
        Self {
            label,
            input: Some(in_tx),
            output: out_rx,
            handle: network::spawn(machine),
        }
    }

    /// The running machine's label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Send a value to the machine
    pub fn send(&self, value: i64) -> Result<(), NetworkError> {
        self.input
            .as_ref()
            .ok_or(NetworkError::InputClosed)?
            .send(value)
            .map_err(|_| NetworkError::InputClosed)
    }

    /// Wait for the machine's next output
    pub fn recv(&self) -> Result<i64, NetworkError> {
        self.output.recv().map_err(|_| NetworkError::OutputClosed)
    }

    /// Send a value, then wait for the response
    pub fn request(&self, value: i64) -> Result<i64, NetworkError> {
        self.send(value)?;
        self.recv()
    }

    /// Close the machine's input, so its next input instruction faults with
    /// [InputExhausted](crate::Fault::InputExhausted) once everything sent has been read
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Iterate over outputs until the machine stops
    pub fn outputs(&self) -> impl Iterator<Item = i64> + '_ {
        self.output.iter()
    }

    /// Disconnect from the machine and wait for it to stop
    ///
    /// Outputs nobody read are discarded here, but are still in the returned machine's output
    /// log. A machine that was still waiting for input, or trying to output, stops with a fault.
    pub fn finish(self) -> Result<Completion, NetworkError> {
        let Self {
            label,
            input,
            output,
            handle,
        } = self;
        drop(input);
        drop(output);
        network::join(&label, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fault;

    #[test]
    fn halting_program_closes_output() {
        let machine = Machine::new([3, 7, 104, 11, 4, 7, 99, 0]).with_label("echo");
        let session = Interactive::spawn(machine);
        assert_eq!(session.label(), "echo");
        assert_eq!(session.request(5), Ok(11));
        assert_eq!(session.recv(), Ok(5));
        assert_eq!(session.recv(), Err(NetworkError::OutputClosed));
        assert_eq!(session.send(1), Err(NetworkError::InputClosed));
        let done = session.finish().unwrap();
        assert_eq!(done.result, Ok(()));
        assert_eq!(done.machine.outputs(), &[11, 5]);
    }

    #[test]
    fn finish_stops_a_talkative_machine() {
        // outputs forever without reading
        let machine = Machine::new([104, 1, 1105, 1, 0]);
        let session = Interactive::spawn(machine);
        assert_eq!(session.recv(), Ok(1));
        assert_eq!(session.outputs().next(), Some(1));
        let done = session.finish().unwrap();
        assert_eq!(done.result, Err(Fault::OutputClosed { ip: 0, value: 1 }));
    }

    #[test]
    fn fault_is_reported_on_finish() {
        let session = Interactive::spawn(Machine::new([3, 0, 42]));
        session.send(7).unwrap();
        assert_eq!(session.recv(), Err(NetworkError::OutputClosed));
        let done = session.finish().unwrap();
        assert_eq!(done.result, Err(Fault::UnknownOpcode { code: 42, ip: 2 }));
        assert_eq!(done.machine[0], 7);
    }
}
