// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Several machines wired together with channels
//!
//! A [Network] is built from a template [Machine] and a list of labels, one per machine. Machine
//! `i` reads from channel `i` and writes to channel `i + 1`. In a [pipeline], the last channel is
//! read by the caller through [Network::output]. In a [feedback] ring, the last machine writes
//! back into channel `0` instead, so that same channel is both the first machine's input and the
//! network's output.
//!
//! Each machine runs on its own thread once [Network::run_async] is called. Channel sends and
//! receives are the only synchronization between them: a machine waiting for input doesn't
//! proceed until its upstream neighbor outputs something, and (depending on the [Capacity]) a
//! machine producing output waits for room downstream.
//!
//! [pipeline]: Topology::Pipeline
//! [feedback]: Topology::Feedback

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::Machine;
use crate::diagnostics::Diagnostics;
use crate::error::{Fault, NetworkError};
use crate::io::{Capacity, InputSource, Receiver, Sender};

/// How the machines of a [Network] are connected
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// An open chain: the last machine's output is the network's output
    #[default]
    Pipeline,
    /// A closed ring: the last machine's output is the first machine's input
    Feedback,
}

/// Settings applied to every machine in a [Network]
#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    /// Zero-pad each machine's memory to at least this many cells
    pub memory_size: Option<usize>,
    /// Capacity of every channel in the network
    pub capacity: Capacity,
    /// Shared transcript sink for every machine
    pub diagnostics: Option<Diagnostics>,
}

/// A machine that finished running as part of a [Network] or [Interactive] session
///
/// [Interactive]: crate::interactive::Interactive
#[derive(Debug)]
pub struct Completion {
    /// The machine's label
    pub label: String,
    /// The machine in its final state, including its output log
    pub machine: Machine,
    /// How the run ended
    pub result: Result<(), Fault>,
}

impl Completion {
    /// Convert a fault into a [NetworkError] naming the machine
    pub fn check(&self) -> Result<(), NetworkError> {
        self.result
            .clone()
            .map_err(|source| NetworkError::Faulted {
                label: self.label.clone(),
                source,
            })
    }
}

pub(crate) type RunHandle = JoinHandle<(Machine, Result<(), Fault>)>;

/// Run `machine` to completion on a new thread, returning it along with how the run ended
pub(crate) fn spawn(mut machine: Machine) -> RunHandle {
    thread::spawn(move || {
        let result = machine.run();
        (machine, result)
    })
}

/// Wait for a machine spawned with [spawn]
pub(crate) fn join(label: &str, handle: RunHandle) -> Result<Completion, NetworkError> {
    match handle.join() {
        Ok((machine, result)) => {
            debug!(machine = label, ok = result.is_ok(), "joined");
            Ok(Completion {
                label: label.to_owned(),
                machine,
                result,
            })
        }
        Err(_) => Err(NetworkError::Panicked {
            label: label.to_owned(),
        }),
    }
}

/// Several machines running the same program, connected by channels
#[derive(Debug)]
pub struct Network {
    topology: Topology,
    capacity: Capacity,
    labels: Vec<Arc<str>>,
    pending: Vec<Machine>,
    handles: Vec<RunHandle>,
    seeds: Option<Vec<Sender<i64>>>,
    input: Option<Sender<i64>>,
    output: Receiver<i64>,
}

impl Network {
    /// Build a network of clones of `template`, one per label
    ///
    /// The template's own I/O connections are not used; each clone is wired into the network.
    pub fn new<L>(
        template: &Machine,
        labels: impl IntoIterator<Item = L>,
        topology: Topology,
        config: NetworkConfig,
    ) -> Self
    where
        L: Into<Arc<str>>,
    {
        let labels: Vec<Arc<str>> = labels.into_iter().map(Into::into).collect();
        let n = labels.len();
        // channel i is machine i's input
        let (channel_count, terminal) = match topology {
            Topology::Pipeline => (n + 1, n),
            Topology::Feedback => (n.max(1), 0),
        };
        let channels: Vec<(Sender<i64>, Receiver<i64>)> = (0..channel_count)
            .map(|_| config.capacity.channel())
            .collect();

        let pending = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let mut machine = template
                    .clone()
                    .with_label(Arc::clone(label))
                    .with_input(InputSource::channel(channels[i].1.clone()))
                    .with_output(channels[(i + 1) % channel_count].0.clone());
                if let Some(size) = config.memory_size {
                    machine = machine.with_memory_size(size);
                }
                if let Some(diag) = &config.diagnostics {
                    machine = machine.with_diagnostics(diag.clone());
                }
                machine
            })
            .collect();

        let seeds = channels[..n].iter().map(|(tx, _)| tx.clone()).collect();
        Self {
            topology,
            capacity: config.capacity,
            labels,
            pending,
            handles: Vec::new(),
            seeds: Some(seeds),
            input: Some(channels[0].0.clone()),
            output: channels[terminal].1.clone(),
        }
    }

    /// A [pipeline](Topology::Pipeline) with the default configuration
    pub fn pipeline<L: Into<Arc<str>>>(
        template: &Machine,
        labels: impl IntoIterator<Item = L>,
    ) -> Self {
        Self::new(template, labels, Topology::Pipeline, NetworkConfig::default())
    }

    /// A [feedback ring](Topology::Feedback) with the default configuration
    pub fn feedback<L: Into<Arc<str>>>(
        template: &Machine,
        labels: impl IntoIterator<Item = L>,
    ) -> Self {
        Self::new(template, labels, Topology::Feedback, NetworkConfig::default())
    }

    /// Number of machines
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no machines
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// How the machines are connected
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Labels of the machines, in order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| &**label)
    }

    /// Send one value into each machine's input, in machine order
    ///
    /// Typically used for phase settings, which each machine reads before anything else. With a
    /// [Rendezvous](Capacity::Rendezvous) capacity this blocks until each machine has read its
    /// value, so the network must already be running.
    ///
    /// This can only be done once. Afterwards the network no longer holds on to the channels
    /// between machines, so a machine sees the end of its input as soon as its upstream neighbor
    /// stops.
    pub fn load_phases(&mut self, values: &[i64]) -> Result<(), NetworkError> {
        let Some(seeds) = self.seeds.as_ref() else {
            return Err(NetworkError::PhasesAlreadyLoaded);
        };
        if values.len() != seeds.len() {
            return Err(NetworkError::PhaseCount {
                expected: seeds.len(),
                got: values.len(),
            });
        }
        for (tx, &value) in seeds.iter().zip(values) {
            tx.send(value).map_err(|_| NetworkError::InputClosed)?;
        }
        debug!(?values, "loaded phases");
        self.seeds = None;
        Ok(())
    }

    /// Start every machine on its own thread and return immediately
    ///
    /// A [feedback ring](Topology::Feedback) with [Rendezvous](Capacity::Rendezvous) channels is
    /// refused with [NetworkError::RendezvousRing]: once the first machine halts, nothing is left
    /// to receive the last machine's final output, so it would never stop.
    pub fn run_async(&mut self) -> Result<(), NetworkError> {
        if !self.handles.is_empty() || (self.pending.is_empty() && !self.labels.is_empty()) {
            return Err(NetworkError::AlreadyRunning);
        }
        if self.topology == Topology::Feedback && self.capacity == Capacity::Rendezvous {
            return Err(NetworkError::RendezvousRing);
        }
        info!(machines = self.pending.len(), topology = ?self.topology, "starting network");
        self.handles = self.pending.drain(..).map(spawn).collect();
        Ok(())
    }

    /// Send a value into the first machine's input
    pub fn input(&self, value: i64) -> Result<(), NetworkError> {
        self.input
            .as_ref()
            .ok_or(NetworkError::InputClosed)?
            .send(value)
            .map_err(|_| NetworkError::InputClosed)
    }

    /// Stop holding the first machine's input open, so it sees end-of-input once drained
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Wait for a value on the network's output channel
    ///
    /// In a feedback ring, the output channel is also the first machine's input, so while the
    /// network is running the two compete for values. Read the output after
    /// [Network::wait_for_completion] instead.
    pub fn output(&self) -> Result<i64, NetworkError> {
        self.output.recv().map_err(|_| NetworkError::OutputClosed)
    }

    /// Iterate over values from the network's output channel until it's closed and drained
    pub fn outputs(&self) -> impl Iterator<Item = i64> + '_ {
        self.output.iter()
    }

    /// Wait until every machine has halted or faulted
    ///
    /// Returns one [Completion] per machine, in order. A fault in one machine is not an error
    /// here; it's recorded in that machine's [Completion] for the caller to inspect, for
    /// example with [Completion::check]. The network's own input is closed first, and after this
    /// returns [Network::output] will not block on an empty channel.
    ///
    /// A machine stuck sending into a full channel never stops, so in a pipeline read the
    /// network's outputs before calling this, unless the channels have room for all of them.
    pub fn wait_for_completion(&mut self) -> Result<Vec<Completion>, NetworkError> {
        if self.handles.is_empty() {
            return Err(NetworkError::NotRunning);
        }
        // nothing more will be sent, so machines waiting on the network see end-of-input
        self.input = None;
        self.seeds = None;
        let mut completions = Vec::with_capacity(self.handles.len());
        let mut panicked = None;
        for (label, handle) in self.labels.iter().zip(self.handles.drain(..)) {
            match join(label, handle) {
                Ok(completion) => {
                    if let Err(fault) = &completion.result {
                        warn!(machine = %label, %fault, "machine in network faulted");
                    }
                    completions.push(completion);
                }
                Err(e) => {
                    panicked.get_or_insert(e);
                }
            }
        }
        match panicked {
            Some(e) => Err(e),
            None => Ok(completions),
        }
    }

    /// Load `phases`, run, send `seed`, wait for every machine, then return the last value the
    /// network produced
    ///
    /// A pipeline's outputs are drained as they arrive, so this works with any [Capacity]. In a
    /// feedback ring the output is read once every machine has stopped, so the last machine's
    /// final outputs have to fit in the channel it writes to.
    ///
    /// Any machine faulting is reported as [NetworkError::Faulted].
    ///
    /// ```
    /// use intcode::prelude::*;
    /// let amp: Machine = "3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0".parse().unwrap();
    /// let mut chain = Network::pipeline(&amp, ["A", "B", "C", "D", "E"]);
    /// assert_eq!(chain.run_trial(&[4, 3, 2, 1, 0], 0), Ok(43210));
    /// ```
    pub fn run_trial(&mut self, phases: &[i64], seed: i64) -> Result<i64, NetworkError> {
        self.run_async()?;
        self.load_phases(phases)?;
        self.input(seed)?;
        let last = match self.topology {
            Topology::Pipeline => {
                self.close_input();
                // ends once the last machine stops and drops its sender
                let last = self.outputs().last();
                let completions = self.wait_for_completion()?;
                completions.iter().try_for_each(Completion::check)?;
                last
            }
            Topology::Feedback => {
                let completions = self.wait_for_completion()?;
                completions.iter().try_for_each(Completion::check)?;
                self.outputs().last()
            }
        };
        last.ok_or(NetworkError::OutputClosed)
    }
}
