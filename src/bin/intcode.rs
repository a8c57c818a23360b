// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Run an Intcode program against stdin and stdout, or search amplifier phase settings

use std::error::Error;
use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::thread;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use intcode::diagnostics::{Diagnostics, Palette, Verbosity};
use intcode::memory::{DEFAULT_SCRATCH_SIZE, Memory};
use intcode::prelude::*;

#[derive(PartialEq, Clone, Copy, ValueEnum)]
enum CodeFormat {
    /// comma-separated ASCII-encoded decimal numbers
    #[value(alias("text"))]
    #[value(alias("aoc"))]
    Ascii,
    /// little-endian 64-bit integers
    #[cfg_attr(target_endian = "little", value(alias("binary-native")))]
    #[value(name("binary-little-endian"), alias("binle"))]
    LittleEndian,
    #[cfg_attr(target_endian = "big", value(alias("binary-native")))]
    #[value(name("binary-big-endian"), alias("binbe"))]
    /// big-endian 64-bit integers
    BigEndian,
}

impl CodeFormat {
    fn load(self, path: &Path) -> Result<Memory, CliError> {
        let read_err = |source| CliError::Read {
            path: path.to_owned(),
            source,
        };
        match self {
            CodeFormat::Ascii => Ok(fs::read_to_string(path).map_err(read_err)?.parse()?),
            CodeFormat::LittleEndian => {
                words(&fs::read(path).map_err(read_err)?, i64::from_le_bytes)
            }
            CodeFormat::BigEndian => {
                words(&fs::read(path).map_err(read_err)?, i64::from_be_bytes)
            }
        }
    }
}

fn words(bytes: &[u8], func: fn([u8; 8]) -> i64) -> Result<Memory, CliError> {
    let chunks = bytes.chunks_exact(8);
    if !chunks.remainder().is_empty() {
        return Err(CliError::IncompleteWord(chunks.remainder().to_vec()));
    }
    Ok(chunks
        .map(|chunk| {
            let mut word = [0; 8];
            word.copy_from_slice(chunk);
            func(word)
        })
        .collect())
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("expected 8 bytes, got {}: {:02x?}", .0.len(), .0)]
    IncompleteWord(Vec<u8>),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("no phase setting produced an output")]
    NoPhases,
}

const VERSION: &str = concat!(env!("CARGO_CRATE_NAME"), '-', env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = VERSION)]
#[command(about = "Intcode machine runner", long_about = None)]
struct Cli {
    /// Log more (repeat for more detail); `RUST_LOG` overrides this
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program, reading one integer per line from stdin and printing outputs to stdout
    Run(RunArgs),
    /// Find the phase settings that give the largest signal out of a chain of amplifiers
    Amplify(AmplifyArgs),
}

#[derive(Args)]
struct Source {
    #[arg(help = "The program to run")]
    source: PathBuf,
    #[arg(help = "Format of the program file")]
    #[arg(short, long)]
    #[arg(default_value = "ascii")]
    format: CodeFormat,
    #[arg(help = "Zero-pad memory to at least this many cells")]
    #[arg(short, long, default_value_t = DEFAULT_SCRATCH_SIZE)]
    memory_size: usize,
}

impl Source {
    fn machine(&self) -> Result<Machine, CliError> {
        let label = match self.source.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => String::from(intcode::DEFAULT_LABEL),
        };
        Ok(Machine::from_memory(self.format.load(&self.source)?)
            .with_label(label)
            .with_memory_size(self.memory_size))
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    source: Source,
    #[arg(help = "Print memory to stderr once the machine stops")]
    #[arg(long)]
    dump: bool,
    #[arg(help = "Write a transcript of inputs and outputs to stderr")]
    #[arg(short, long)]
    transcript: bool,
    #[arg(help = "Include every executed instruction in the transcript")]
    #[arg(long, requires = "transcript")]
    trace: bool,
    #[arg(help = "Color the transcript")]
    #[arg(long, requires = "transcript")]
    color: bool,
}

#[derive(Args)]
struct AmplifyArgs {
    #[command(flatten)]
    source: Source,
    #[arg(help = "Connect the last amplifier back to the first")]
    #[arg(long)]
    feedback: bool,
    #[arg(help = "Phase settings to try every ordering of [default: 0-4, or 5-9 with --feedback]")]
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    phases: Option<Vec<i64>>,
    #[arg(help = "Signal sent into the first amplifier")]
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    seed: i64,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let mut machine = args
        .source
        .machine()?
        .with_input(InputSource::lines(BufReader::new(io::stdin())));
    if args.transcript {
        let palette = if args.color { Palette::ANSI } else { Palette::PLAIN };
        let verbosity = if args.trace {
            Verbosity::Instructions
        } else {
            Verbosity::Io
        };
        machine = machine.with_diagnostics(
            Diagnostics::stderr()
                .with_palette(palette)
                .with_verbosity(verbosity),
        );
    }

    let (tx, rx) = Capacity::Unbounded.channel();
    let printer = thread::spawn(move || {
        for value in rx {
            println!("{value}");
        }
    });
    machine.set_output(Some(tx));
    let result = machine.run();
    // a machine that stopped no longer holds the sender, so the printer sees the end
    if printer.join().is_err() {
        return Err("output thread panicked".into());
    }
    debug!(ip = machine.instruction_pointer(), "machine stopped");
    if args.dump {
        eprintln!("{}", machine.dump_memory());
    }
    Ok(result?)
}

fn amplify(args: &AmplifyArgs) -> Result<(), Box<dyn Error>> {
    let template = args.source.machine()?;
    let (topology, default_phases) = if args.feedback {
        (Topology::Feedback, 5..10)
    } else {
        (Topology::Pipeline, 0..5)
    };
    let phases = args
        .phases
        .clone()
        .unwrap_or_else(|| default_phases.collect());
    let labels: Vec<String> = (b'A'..)
        .take(phases.len())
        .map(|c| char::from(c).to_string())
        .collect();

    let mut best: Option<(i64, Vec<i64>)> = None;
    for order in phases.iter().copied().permutations(phases.len()) {
        let mut network = Network::new(
            &template,
            labels.iter().cloned(),
            topology,
            NetworkConfig::default(),
        );
        let signal = network.run_trial(&order, args.seed)?;
        debug!(phases = ?order, signal, "trial finished");
        if best.as_ref().is_none_or(|(top, _)| signal > *top) {
            best = Some((signal, order));
        }
    }
    let (signal, order) = best.ok_or(CliError::NoPhases)?;
    info!(phases = %order.iter().format(","), "best phase setting");
    println!("{signal}");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Command::Run(args) => run(args),
        Command::Amplify(args) => amplify(args),
    }
}
