// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 2 built using the `intcode` library.

use intcode::prelude::*;

/// Patch the noun and verb into a copy of `template`, run it, and read position 0
fn run_with(template: &Machine, noun: i64, verb: i64) -> i64 {
    let mut m = template.clone();
    m.mem_set(1, noun).expect("program too short");
    m.mem_set(2, verb).expect("program too short");
    let output = m.run_with_inputs(empty()).unwrap();
    assert!(m.is_halted(), "intcode did not run to completion");
    assert!(output.is_empty(), "intcode had unexpected output");
    m[0]
}

fn part2(template: &Machine) -> i64 {
    for noun in 0..=99 {
        for verb in 0..=99 {
            #[allow(clippy::unreadable_literal, reason = "from Advent of Code")]
            if run_with(template, noun, verb) == 19690720 {
                return 100 * noun + verb;
            }
        }
    }
    panic!("no answer found for part 2");
}

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");

    let machine: Machine = input.parse().unwrap();
    println!("part 1: {}", run_with(&machine, 12, 2));
    println!("part 2: {}", part2(&machine));
}
