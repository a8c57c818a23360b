// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A human-readable transcript of what a machine is doing
//!
//! This is separate from the structured [`tracing`] events the engine emits: a [Diagnostics]
//! value writes plain lines to any [`io::Write`] sink, optionally colored with a [Palette].
//! Machines behave identically whether or not one is attached, and errors writing to the sink
//! are logged and otherwise ignored.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::decode::Instruction;
use crate::error::Fault;

/// Escape sequences used to color transcript lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs, reason = "names are self-explanatory")]
pub struct Palette {
    pub reset: &'static str,
    pub red: &'static str,
    pub green: &'static str,
    pub yellow: &'static str,
    pub blue: &'static str,
    pub purple: &'static str,
    pub cyan: &'static str,
}

impl Palette {
    /// ANSI terminal colors
    pub const ANSI: Self = Self {
        reset: "\x1b[0m",
        red: "\x1b[31m",
        green: "\x1b[32m",
        yellow: "\x1b[33m",
        blue: "\x1b[34m",
        purple: "\x1b[35m",
        cyan: "\x1b[36m",
    };

    /// No coloring at all
    pub const PLAIN: Self = Self {
        reset: "",
        red: "",
        green: "",
        yellow: "",
        blue: "",
        purple: "",
        cyan: "",
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::PLAIN
    }
}

/// How much goes into the transcript
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Inputs, outputs, halts and faults
    #[default]
    Io,
    /// Additionally, every instruction as it's executed
    Instructions,
}

/// A shared transcript sink
///
/// Cloning a [Diagnostics] shares the sink, so several machines can write to the same place.
/// Each line is prefixed with the label of the machine that wrote it.
///
/// # Example
///
/// ```
/// use intcode::prelude::*;
/// use intcode::diagnostics::{Diagnostics, Palette};
/// use std::sync::{Arc, Mutex};
///
/// let mut machine = Machine::new([104, 7, 99])
///     .with_label("demo")
///     .with_diagnostics(Diagnostics::new(std::io::sink()).with_palette(Palette::PLAIN));
/// machine.run().unwrap();
/// assert_eq!(machine.outputs(), &[7]);
/// ```
#[derive(Clone)]
pub struct Diagnostics {
    sink: Arc<Mutex<dyn Write + Send>>,
    palette: Palette,
    verbosity: Verbosity,
}

impl Diagnostics {
    /// Write the transcript to `sink`
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
            palette: Palette::PLAIN,
            verbosity: Verbosity::Io,
        }
    }

    /// Write the transcript to standard error
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Set the palette
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set the verbosity
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// The palette in use
    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// The verbosity in use
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn line(&self, label: &str, args: fmt::Arguments<'_>) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        if let Err(e) = writeln!(sink, "[{label}] {args}") {
            tracing::warn!(machine = label, error = %e, "failed to write diagnostics");
        }
    }

    pub(crate) fn instruction(&self, label: &str, instr: &Instruction, rel_base: i64) {
        if self.verbosity >= Verbosity::Instructions {
            let Palette { cyan, reset, .. } = self.palette;
            self.line(
                label,
                format_args!(
                    "{cyan}{:>6}{reset} | rbo {rel_base:>5} | {:05} {instr}",
                    instr.ip, instr.word
                ),
            );
        }
    }

    pub(crate) fn prompt(&self, label: &str) {
        let Palette { blue, reset, .. } = self.palette;
        self.line(label, format_args!("{blue}ENTER INPUT{reset}"));
    }

    pub(crate) fn input(&self, label: &str, value: i64) {
        let Palette { green, reset, .. } = self.palette;
        self.line(label, format_args!("{green}IN : {value}{reset}"));
    }

    pub(crate) fn output(&self, label: &str, value: i64) {
        let Palette { green, reset, .. } = self.palette;
        self.line(label, format_args!("{green}OUT : {value}{reset}"));
    }

    pub(crate) fn halt(&self, label: &str) {
        let Palette { red, reset, .. } = self.palette;
        self.line(label, format_args!("{red}HALT{reset}"));
    }

    pub(crate) fn fault(&self, label: &str, fault: &Fault) {
        let Palette { red, reset, .. } = self.palette;
        self.line(label, format_args!("{red}FAULT: {fault}{reset}"));
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("palette", &self.palette)
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A sink that can be inspected after handing a clone to [Diagnostics]
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn plain_lines_are_labelled() {
        let buf = SharedBuf::default();
        let diag = Diagnostics::new(buf.clone());
        diag.input("amp-a", 4);
        diag.output("amp-a", 5);
        diag.halt("amp-a");
        assert_eq!(buf.text(), "[amp-a] IN : 4\n[amp-a] OUT : 5\n[amp-a] HALT\n");
    }

    #[test]
    fn ansi_palette_colors_lines() {
        let buf = SharedBuf::default();
        let diag = Diagnostics::new(buf.clone()).with_palette(Palette::ANSI);
        diag.halt("m");
        assert_eq!(buf.text(), "[m] \x1b[31mHALT\x1b[0m\n");
    }

    #[test]
    fn instructions_only_at_high_verbosity() {
        use crate::decode::{Instruction, Operation};
        let instr = Instruction {
            ip: 8,
            word: 99,
            op: Operation::Halt,
        };
        let buf = SharedBuf::default();
        let diag = Diagnostics::new(buf.clone());
        diag.instruction("m", &instr, 0);
        assert!(buf.text().is_empty());
        let diag = diag.with_verbosity(Verbosity::Instructions);
        diag.instruction("m", &instr, 3);
        assert_eq!(buf.text(), "[m]      8 | rbo     3 | 00099 HALT\n");
    }
}
