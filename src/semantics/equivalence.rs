//! Exhaustive equivalence checking over a fixed input size
//!
//! Two programs are equivalent at HxW when they produce identical output
//! boards for every one of the 2^(H*W) input boards. The fast path
//! compiles both programs to op tapes once and replays them per input;
//! the interpreter path re-runs the programs directly and also accepts an
//! opaque board function in place of a program on either side.

use log::debug;

use crate::board::Board;
use crate::ir::Instruction;
use crate::semantics::codegen::compile_trace;
use crate::semantics::interp::{run_program, RunError};
use crate::semantics::symbolic::build_trace;

/// Inputs of 64 cells or more cannot be enumerated in a u64
pub const MAX_INPUT_CELLS: usize = 63;

/// Verdict of one exhaustive check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquivalenceResult {
    Equivalent {
        /// Number of input boards evaluated, always 2^(H*W)
        tested_count: u64,
    },
    NotEquivalent {
        /// Number of input boards evaluated before the mismatch
        tested_count: u64,
        /// The first input board the two sides disagreed on
        witness: Board<bool>,
    },
}

impl EquivalenceResult {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, EquivalenceResult::Equivalent { .. })
    }

    pub fn tested_count(&self) -> u64 {
        match self {
            EquivalenceResult::Equivalent { tested_count } => *tested_count,
            EquivalenceResult::NotEquivalent { tested_count, .. } => *tested_count,
        }
    }
}

/// Build the input board whose cell at linear index k holds bit k of `bits`
pub fn board_from_bits(height: usize, width: usize, bits: u64) -> Board<bool> {
    Board::plot(height, width, |i, j| bits >> (i * width + j) & 1 == 1)
}

fn enumeration_mask(height: usize, width: usize) -> Result<u64, RunError> {
    let cells = height * width;
    if cells > MAX_INPUT_CELLS {
        return Err(RunError::InputTooLarge { cells });
    }
    Ok((1u64 << cells) - 1)
}

/// Check two programs over every HxW input via compiled op tapes
pub fn check_equivalence(
    program_a: &[Instruction],
    program_b: &[Instruction],
    height: usize,
    width: usize,
) -> Result<EquivalenceResult, RunError> {
    let mask = enumeration_mask(height, width)?;

    let tape_a = compile_trace(&build_trace(program_a, height, width)?, "a_")?;
    let tape_b = compile_trace(&build_trace(program_b, height, width)?, "b_")?;

    if tape_a.output_size() != tape_b.output_size() {
        // Disagreeing shapes fail without enumeration; the all-zero board
        // already witnesses the mismatch.
        return Ok(EquivalenceResult::NotEquivalent {
            tested_count: 1,
            witness: Board::empty(height, width),
        });
    }

    debug!(
        "checking {}x{} compiled, {} inputs, {}+{} tape ops",
        height,
        width,
        mask + 1,
        tape_a.slot_count(),
        tape_b.slot_count()
    );

    let mut slots_a = vec![false; tape_a.slot_count()];
    let mut slots_b = vec![false; tape_b.slot_count()];
    for bits in 0..=mask {
        tape_a.eval_slots(bits, &mut slots_a);
        tape_b.eval_slots(bits, &mut slots_b);
        for index in 0..tape_a.output_len() {
            if tape_a.output_bit(index, &slots_a) != tape_b.output_bit(index, &slots_b) {
                return Ok(EquivalenceResult::NotEquivalent {
                    tested_count: bits + 1,
                    witness: board_from_bits(height, width, bits),
                });
            }
        }
    }

    Ok(EquivalenceResult::Equivalent {
        tested_count: mask + 1,
    })
}

/// One side of an interpreted check
pub enum EquivSide<'a> {
    Program(&'a [Instruction]),
    /// An arbitrary board function standing in for a program
    Opaque(&'a dyn Fn(&Board<bool>) -> Result<Board<bool>, RunError>),
}

impl EquivSide<'_> {
    fn apply(&self, input: &Board<bool>) -> Result<Board<bool>, RunError> {
        match self {
            EquivSide::Program(program) => {
                Ok(run_program(program, input.clone(), &mut ())?.focus)
            }
            EquivSide::Opaque(f) => f(input),
        }
    }
}

/// Check two sides by direct interpretation over every HxW input
pub fn check_equivalence_interpreted(
    side_a: &EquivSide<'_>,
    side_b: &EquivSide<'_>,
    height: usize,
    width: usize,
) -> Result<EquivalenceResult, RunError> {
    let mask = enumeration_mask(height, width)?;
    check_equivalence_under_mask(side_a, side_b, height, width, mask)
}

/// Interpreted check walking downward from `mask` and wrapping through it,
/// so the all-ones board is evaluated first and all-zeros last
pub fn check_equivalence_under_mask(
    side_a: &EquivSide<'_>,
    side_b: &EquivSide<'_>,
    height: usize,
    width: usize,
    mask: u64,
) -> Result<EquivalenceResult, RunError> {
    debug!("checking {}x{} interpreted, {} inputs", height, width, mask + 1);

    let mut bits = mask;
    let mut tested_count = 0u64;
    loop {
        let input = board_from_bits(height, width, bits);
        tested_count += 1;
        if side_a.apply(&input)? != side_b.apply(&input)? {
            return Ok(EquivalenceResult::NotEquivalent {
                tested_count,
                witness: input,
            });
        }
        if bits == 0 {
            break;
        }
        bits = bits.wrapping_sub(1) & mask;
    }

    Ok(EquivalenceResult::Equivalent { tested_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;
    use test_log::test;

    fn programs(a: &str, b: &str) -> (Vec<Instruction>, Vec<Instruction>) {
        (
            parse_program(a).expect("program a parses"),
            parse_program(b).expect("program b parses"),
        )
    }

    fn check(a: &str, b: &str, height: usize, width: usize) -> EquivalenceResult {
        let (pa, pb) = programs(a, b);
        check_equivalence(&pa, &pb, height, width).expect("check runs")
    }

    fn check_interp(a: &str, b: &str, height: usize, width: usize) -> EquivalenceResult {
        let (pa, pb) = programs(a, b);
        check_equivalence_interpreted(
            &EquivSide::Program(&pa),
            &EquivSide::Program(&pb),
            height,
            width,
        )
        .expect("check runs")
    }

    #[test]
    fn test_flip_decomposition_equivalent() {
        let result = check("mh", "md mv md", 2, 2);
        assert_eq!(result, EquivalenceResult::Equivalent { tested_count: 16 });
    }

    #[test]
    fn test_not_as_xor_with_ones() {
        let result = check("~", "^ (#11/11)", 2, 2);
        assert_eq!(result, EquivalenceResult::Equivalent { tested_count: 16 });
    }

    #[test]
    fn test_perturbed_mask_not_equivalent() {
        let result = check("~", "^ (#11/01)", 2, 2);
        match result {
            EquivalenceResult::NotEquivalent {
                witness,
                tested_count,
            } => {
                // The witness must genuinely distinguish the programs.
                let (pa, pb) = programs("~", "^ (#11/01)");
                let out_a = run_program(&pa, witness.clone(), &mut ()).unwrap().focus;
                let out_b = run_program(&pb, witness.clone(), &mut ()).unwrap().focus;
                assert_ne!(out_a, out_b);
                assert!(tested_count >= 1 && tested_count <= 16);
            }
            other => panic!("expected a counterexample, got {:?}", other),
        }
    }

    #[test]
    fn test_output_shape_mismatch() {
        // One side folds away a dimension, the other does not.
        let result = check("&&l", "", 2, 2);
        assert_eq!(
            result,
            EquivalenceResult::NotEquivalent {
                tested_count: 1,
                witness: Board::empty(2, 2),
            }
        );
    }

    #[test]
    fn test_tested_count_is_full_space() {
        let result = check("mv mv", "", 3, 2);
        assert_eq!(result, EquivalenceResult::Equivalent { tested_count: 64 });
    }

    #[test]
    fn test_interpreted_agrees_with_compiled() {
        for (a, b) in [
            ("mh", "md mv md"),
            ("~", "^ (#11/11)"),
            ("~", "^ (#11/01)"),
            ("tb1", "mv tt1 mv"),
        ] {
            let compiled = check(a, b, 2, 2);
            let interpreted = check_interp(a, b, 2, 2);
            assert_eq!(
                compiled.is_equivalent(),
                interpreted.is_equivalent(),
                "paths disagree on '{}' vs '{}'",
                a,
                b
            );
        }
    }

    #[test]
    fn test_interpreted_walks_from_all_ones() {
        // The first disagreement found by the interpreted path is the
        // all-ones board, after exactly one evaluation.
        let result = check_interp("", "~", 1, 2);
        assert_eq!(
            result,
            EquivalenceResult::NotEquivalent {
                tested_count: 1,
                witness: board_from_bits(1, 2, 0b11),
            }
        );
    }

    #[test]
    fn test_opaque_side() {
        let program = parse_program("mv").expect("parses");
        let flipped = |input: &Board<bool>| -> Result<Board<bool>, RunError> {
            Ok(input.transform(crate::ir::Transform::FlipVertical))
        };
        let result = check_equivalence_interpreted(
            &EquivSide::Program(&program),
            &EquivSide::Opaque(&flipped),
            2,
            3,
        )
        .expect("check runs");
        assert_eq!(result, EquivalenceResult::Equivalent { tested_count: 64 });
    }

    #[test]
    fn test_too_many_cells_rejected() {
        let (pa, pb) = programs("", "");
        assert_eq!(
            check_equivalence(&pa, &pb, 8, 8).unwrap_err(),
            RunError::InputTooLarge { cells: 64 }
        );
    }
}
