// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 7 built using the `intcode` library.

use intcode::prelude::*;
use itertools::Itertools;

const AMPS: [&str; 5] = ["A", "B", "C", "D", "E"];

fn best_signal(template: &Machine, topology: Topology, phases: [i64; 5]) -> i64 {
    phases
        .into_iter()
        .permutations(phases.len())
        .map(|order| {
            let mut amps = Network::new(template, AMPS, topology, NetworkConfig::default());
            amps.run_trial(&order, 0).unwrap()
        })
        .max()
        .unwrap()
}

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");

    let machine: Machine = input.parse().unwrap();
    println!(
        "part 1: {}",
        best_signal(&machine, Topology::Pipeline, [0, 1, 2, 3, 4])
    );
    println!(
        "part 2: {}",
        best_signal(&machine, Topology::Feedback, [5, 6, 7, 8, 9])
    );
}
