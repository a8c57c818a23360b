//! Test that examples from Advent of Code problem descriptions behave as described.
// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use intcode::prelude::*;
use intcode::trace::{Trace, TracedInstr};
use intcode::{OpCode, ParamMode};
use itertools::Itertools;

// first, some groundwork for common elements of different tests

/// Construct a new machine with the given starting code
macro_rules! machine {
    [$($i:expr),*] => {{
        Machine::new([$($i),*])
    }}
}

/// Run a machine to end, returning its output.
/// Borrows the machine in case its trace or memory is useful
fn run_to_end(machine: &mut Machine, inputs: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let output = machine.run_with_inputs(inputs).unwrap();
    assert_eq!(machine.state(), &State::Halted);
    output
}

/// A struct with the information about expected traced instruction
struct ExpectedOp {
    op_int: i64,
    instr_ptr: i64,
    stored_val: Option<i64>,
}

impl ExpectedOp {
    const fn new(op_int: i64, instr_ptr: i64, stored_val: Option<i64>) -> Self {
        Self {
            op_int,
            instr_ptr,
            stored_val,
        }
    }

    fn validate(self, traced: TracedInstr) {
        assert_eq!(self.op_int, traced.op_int());
        assert_eq!(self.instr_ptr, traced.instr_ptr());
        assert_eq!(self.stored_val, traced.stored_val());
    }
}

fn validate_trace(expected: impl IntoIterator<Item = ExpectedOp>, Trace(trace): Trace) {
    expected
        .into_iter()
        .zip_eq(trace)
        .for_each(|(op, instr)| op.validate(instr));
}

mod day2_examples {
    use crate::*;

    /// the extended example used to help illustrate the basics
    #[test]
    fn extended_example() {
        let mut m = machine![1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50];
        m.start_trace();
        let output = run_to_end(&mut m, empty());
        assert!(output.is_empty());
        const EXPECTED: [ExpectedOp; 3] = [
            ExpectedOp::new(1, 0, Some(70)),
            ExpectedOp::new(2, 4, Some(3500)),
            ExpectedOp::new(99, 8, None),
        ];
        validate_trace(EXPECTED, m.end_trace().unwrap());
        assert_eq!(m.dump_memory(), "3500,9,10,70,2,3,11,0,99,30,40,50");
    }

    /// the extra, smaller examples that are listed after the extended example
    #[test]
    fn small_examples() {
        for (code, expected) in [
            ("1,0,0,0,99", "2,0,0,0,99"),
            ("2,3,0,3,99", "2,3,0,6,99"),
            ("2,4,4,5,99,0", "2,4,4,5,99,9801"),
            ("1,1,1,4,99,5,6,0,99", "30,1,1,4,2,5,6,0,99"),
        ] {
            let mut m: Machine = code.parse().unwrap();
            run_to_end(&mut m, []);
            assert_eq!(m.dump_memory(), expected, "running {code}");
        }
    }

    /// patching the noun and verb into clones leaves the template alone
    #[test]
    fn patched_clones() {
        let template = machine![1, 0, 0, 0, 99];
        let mut patched = template.clone();
        assert_eq!(patched.mem_set(1, 4), Some(0));
        assert_eq!(patched.mem_set(2, 4), Some(0));
        run_to_end(&mut patched, []);
        assert_eq!(patched[0], 198);
        assert_eq!(template.dump_memory(), "1,0,0,0,99");
    }
}

mod day5_examples {
    mod part1 {
        use crate::*;

        #[test]
        fn echo_input() {
            let template = machine![3, 0, 4, 0, 99];
            for i in -128..128 {
                assert_eq!(run_to_end(&mut template.clone(), [i]), vec![i]);
            }
        }

        #[test]
        fn store_input_then_halt() {
            let mut m = machine![3, 3, 99, 0];
            assert!(run_to_end(&mut m, [23]).is_empty());
            assert_eq!(m.dump_memory(), "3,3,99,23");
        }

        #[test]
        fn immediate_mode_example() {
            let mut m = machine![1002, 4, 3, 4, 33];
            m.start_trace();
            let output = run_to_end(&mut m, []);
            assert!(output.is_empty());
            const EXPECTED: [ExpectedOp; 2] = [
                ExpectedOp::new(1002, 0, Some(99)),
                ExpectedOp::new(99, 4, None),
            ];
            let trace = m.end_trace().unwrap();
            assert_eq!(
                trace.0[0].param_modes(),
                [
                    ParamMode::Positional,
                    ParamMode::Immediate,
                    ParamMode::Positional
                ]
            );
            validate_trace(EXPECTED, trace);
        }

        #[test]
        fn negative_immediate() {
            let mut m = machine![1101, 100, -1, 4, 0];
            run_to_end(&mut m, []);
            assert_eq!(m[4], 99);

            let mut m = machine![1001, 0, 200, 0, 99];
            run_to_end(&mut m, []);
            assert_eq!(m.dump_memory(), "1201,0,200,0,99");
        }

        #[test]
        fn line_input() {
            use std::io::Cursor;
            let mut m = machine![3, 0, 3, 1, 4, 0, 4, 1, 99]
                .with_input(InputSource::lines(Cursor::new(" 17\n-4\n")));
            m.run().unwrap();
            assert_eq!(m.outputs(), &[17, -4]);
        }
    }

    mod part2 {
        use crate::*;

        #[test]
        fn comparison_examples() {
            let templates = [
                machine![3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8],
                machine![3, 9, 7, 9, 10, 9, 4, 9, 99, -1, 8],
                machine![3, 3, 1108, -1, 8, 3, 4, 3, 99],
                machine![3, 3, 1107, -1, 8, 3, 4, 3, 99],
            ];

            let expected_builder = |mode: ParamMode, cmp_op: OpCode, input: i64| {
                let val = i64::from(if cmp_op == OpCode::Lt {
                    input < 8
                } else {
                    input == 8
                });
                let expected = [
                    ExpectedOp::new(OpCode::In as i64, 0, Some(input)),
                    ExpectedOp::new(cmp_op as i64 + (mode as i64 * 1100), 2, Some(val)),
                    ExpectedOp::new(OpCode::Out as i64, 6, None),
                    ExpectedOp::new(OpCode::Halt as i64, 8, None),
                ];
                (expected, val)
            };

            let expected = |i: i64| {
                [
                    expected_builder(ParamMode::Positional, OpCode::Eq, i),
                    expected_builder(ParamMode::Positional, OpCode::Lt, i),
                    expected_builder(ParamMode::Immediate, OpCode::Eq, i),
                    expected_builder(ParamMode::Immediate, OpCode::Lt, i),
                ]
            };

            for input in [7, 8, 9] {
                let expected_traces = expected(input);
                for (template, (trace, out)) in templates.iter().zip(expected_traces) {
                    let mut m = template.clone();
                    m.start_trace();
                    assert_eq!(run_to_end(&mut m, [input]), vec![out]);
                    validate_trace(trace, m.end_trace().unwrap());
                }
            }
        }

        #[test]
        fn jump_examples() {
            let templates = [
                machine![3, 12, 6, 12, 15, 1, 13, 14, 13, 4, 13, 99, -1, 0, 1, 9],
                machine![3, 3, 1105, -1, 9, 1101, 0, 0, 12, 4, 12, 99, 1],
            ];

            for i in [0, 1] {
                let mut machines = templates.clone();
                for m in &mut machines {
                    m.set_input(InputSource::values([i]));
                    assert_eq!(m.step(), Ok(Control::Continue));
                    m.start_trace();
                    assert_eq!(m.step(), Ok(Control::Continue));
                }
                let modes: [[ParamMode; 3]; 2] = core::array::from_fn(|n| {
                    let Trace(trace) = machines[n].end_trace().unwrap();
                    assert_eq!(trace.len(), 1);
                    trace[0].param_modes()
                });
                for mut m in machines {
                    assert_eq!(run_to_end(&mut m, empty()), vec![i]);
                }
                assert_eq!(
                    modes,
                    [
                        [ParamMode::Positional; 3],
                        [
                            ParamMode::Immediate,
                            ParamMode::Immediate,
                            ParamMode::Positional
                        ]
                    ]
                );
            }
        }

        /// > output 999 if the input value is below 8, output 1000 if the input value is equal
        /// > to 8, or output 1001 if the input value is greater than 8.
        #[test]
        fn larger_example() {
            let template: Machine = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
                1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,\
                999,1105,1,46,1101,1000,1,20,4,20,1105,1,46,98,99"
                .parse()
                .unwrap();
            for (input, expected) in [(-5, 999), (7, 999), (8, 1000), (9, 1001), (98, 1001)] {
                assert_eq!(run_to_end(&mut template.clone(), [input]), vec![expected]);
            }
        }
    }
}

mod day9_examples {
    mod part1 {
        use crate::*;
        /// > takes no input and produces a copy of itself as output.
        #[test]
        fn quine() {
            let quine_code = [
                109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99,
            ];
            let mut m = Machine::new(quine_code).with_memory_size(128);
            let output = run_to_end(&mut m, empty());
            assert_eq!(output.as_slice(), quine_code.as_slice());
        }

        /// without scratch space, the quine's first write is out of bounds
        #[test]
        fn quine_without_scratch() {
            let mut m = machine![
                109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99
            ];
            assert!(matches!(
                m.run(),
                Err(Fault::InvalidAddress { ip: 4, .. })
            ));
            assert_eq!(m.outputs(), &[109]);
        }

        /// > should output a 16-digit number
        #[test]
        fn output_sixteen_digit() {
            let mut m = machine![1102, 34915192, 34915192, 7, 4, 7, 99, 0];
            let output = run_to_end(&mut m, empty());
            assert_eq!(output.len(), 1, "{output:?}");
            assert_eq!(output[0].to_string().len(), 16, "{output:?}");
        }

        /// > should output the large number in the middle
        #[test]
        fn large_number() {
            let mut m = machine![104, 1125899906842624, 99];
            let output = run_to_end(&mut m, empty());
            assert_eq!(output, vec![1125899906842624]);
        }
    }
}
