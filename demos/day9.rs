// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 9 built using the `intcode` library.

use intcode::memory::DEFAULT_SCRATCH_SIZE;
use intcode::prelude::*;

fn boost(template: &Machine, mode: i64) -> i64 {
    let mut m = template.clone();
    let output = m.run_with_inputs([mode]).unwrap();
    assert!(m.is_halted(), "intcode did not halt");
    assert_eq!(output.len(), 1, "{output:?}");
    output[0]
}

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");

    // BOOST needs scratch memory beyond the end of the program
    let machine = Machine::parse(&input)
        .unwrap()
        .with_memory_size(DEFAULT_SCRATCH_SIZE);
    println!("part 1: {}", boost(&machine, 1));
    println!("part 2: {}", boost(&machine, 2));
}
