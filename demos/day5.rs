// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 5 built using the `intcode` library.

use intcode::prelude::*;

/// Run the diagnostic program for system `id`, checking that every test before the final code
/// passed
fn diagnose(template: &Machine, id: i64) -> i64 {
    let mut m = template.clone();
    let mut outputs = m.run_with_inputs([id]).unwrap();
    assert!(m.is_halted(), "intcode did not halt");
    let diagnostic = outputs.pop().unwrap();
    assert!(outputs.into_iter().all(|i| i == 0), "diagnostic failed");
    diagnostic
}

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");

    let machine: Machine = input.parse().unwrap();
    println!("part 1: {}", diagnose(&machine, 1));
    println!("part 2: {}", diagnose(&machine, 5));
}
