//! Single-pass interpreter over instruction lists
//!
//! Generic over the cell domain: the same pass executes concrete boards and
//! builds symbolic graphs, depending only on which `CellDomain` the caller
//! instantiates.

use std::fmt;

use crate::board::{Board, CellDomain, DimensionMismatch};
use crate::ir::{BitOp, Instruction, MoveOp, Operand};
use crate::semantics::state::ExecState;

/// Fatal failure during a single program run or equivalence check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// A load or operand referenced a board name never stored
    UndefinedBoard(String),
    /// A bitwise/equality/append instruction had no operand group
    MissingOperand(String),
    /// Board concatenation with unequal widths
    Dimension(DimensionMismatch),
    /// Instruction that parses but cannot be executed
    NotExecutable(String),
    /// Input boards with too many cells to enumerate
    InputTooLarge { cells: usize },
    /// A traced variable node matched no cell of the input board
    UnmappedInput { index: usize },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::UndefinedBoard(name) => write!(f, "undefined board name: {}", name),
            RunError::MissingOperand(instr) => {
                write!(f, "instruction '{}' is missing its operand", instr)
            }
            RunError::Dimension(err) => write!(f, "{}", err),
            RunError::NotExecutable(what) => write!(f, "not executable: {}", what),
            RunError::InputTooLarge { cells } => {
                write!(f, "input board has {} cells; at most 63 can be enumerated", cells)
            }
            RunError::UnmappedInput { index } => {
                write!(f, "variable node for input {} has no matching input cell", index)
            }
        }
    }
}

impl std::error::Error for RunError {}

impl From<DimensionMismatch> for RunError {
    fn from(err: DimensionMismatch) -> Self {
        RunError::Dimension(err)
    }
}

fn resolve_operand<T: CellDomain>(
    state: &ExecState<T>,
    operand: Option<&Operand>,
    instruction: &Instruction,
) -> Result<Board<T>, RunError> {
    match operand {
        None => Err(RunError::MissingOperand(instruction.to_string())),
        Some(Operand::Literal(board)) => Ok(board.map(|&bit| T::from_bit(bit))),
        Some(Operand::Named(name)) => state
            .load(name)
            .cloned()
            .ok_or_else(|| RunError::UndefinedBoard(name.clone())),
    }
}

/// Apply a single instruction to the state
///
/// Every instruction writes exactly one entry: the focus, or the named
/// target of a store.
pub fn apply_instruction<T: CellDomain>(
    state: &mut ExecState<T>,
    instruction: &Instruction,
    ctx: &mut T::Ctx,
) -> Result<(), RunError> {
    match instruction {
        Instruction::Literal(board) => {
            state.focus = board.map(|&bit| T::from_bit(bit));
        }
        Instruction::Load(name) => {
            state.focus = state
                .load(name)
                .cloned()
                .ok_or_else(|| RunError::UndefinedBoard(name.clone()))?;
        }
        Instruction::Store(name) => {
            let focus = state.focus.clone();
            state.store(name, focus);
        }
        Instruction::Not => {
            state.focus = state.focus.bitnot(ctx);
        }
        Instruction::Bitwise { op, operand } => {
            let other = resolve_operand(state, operand.as_ref(), instruction)?;
            state.focus = match op {
                BitOp::And => state.focus.bitand(&other, ctx),
                BitOp::Or => state.focus.bitor(&other, ctx),
                BitOp::Xor => state.focus.bitxor(&other, ctx),
            };
        }
        Instruction::Equals { operand } => {
            let other = resolve_operand(state, operand.as_ref(), instruction)?;
            state.focus = state.focus.equals_board(&other, ctx);
        }
        Instruction::RowFold { op, dir } => {
            state.focus = state.focus.row_fold(*op, *dir, ctx);
        }
        Instruction::Move { op, dir, count } => {
            state.focus = match op {
                MoveOp::Take => state.focus.take(*dir, *count),
                MoveOp::Delete => state.focus.delete(*dir, *count),
                MoveOp::Copy => state.focus.copy_times(*dir, *count),
                MoveOp::Extend => state.focus.extend(*dir, *count),
                MoveOp::Shift => state.focus.shift(*dir, *count),
                MoveOp::Roll => state.focus.roll(*dir, *count),
            };
        }
        Instruction::Append { dir, operand } => {
            let other = resolve_operand(state, operand.as_ref(), instruction)?;
            state.focus = state.focus.append(*dir, &other)?;
        }
        Instruction::Transform(tf) => {
            state.focus = state.focus.transform(*tf);
        }
        Instruction::Repeat { .. } => {
            return Err(RunError::NotExecutable(
                "repeat blocks parse but are not connected to execution".to_string(),
            ));
        }
    }
    Ok(())
}

/// Execute a program against an input board, returning the final state
pub fn run_program<T: CellDomain>(
    program: &[Instruction],
    input: Board<T>,
    ctx: &mut T::Ctx,
) -> Result<ExecState<T>, RunError> {
    let mut state = ExecState::new(input);
    for instruction in program {
        apply_instruction(&mut state, instruction, ctx)?;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;

    fn bits(s: &str) -> Board<bool> {
        crate::parser::read_board(s)
    }

    fn run(source: &str, input: Board<bool>) -> Result<Board<bool>, RunError> {
        let program = parse_program(source).expect("test program parses");
        Ok(run_program(&program, input, &mut ())?.focus)
    }

    #[test]
    fn test_literal_replaces_focus() {
        assert_eq!(run("#11/00", bits("0")).unwrap(), bits("11/00"));
    }

    #[test]
    fn test_reverse_scenario() {
        assert_eq!(run("mv", bits("10/01")).unwrap(), bits("01/10"));
    }

    #[test]
    fn test_transpose_scenario() {
        assert_eq!(run("md", bits("10/11")).unwrap(), bits("11/01"));
    }

    #[test]
    fn test_flip_horizontal_matches_decomposition() {
        let input = bits("10/01");
        let direct = run("mh", input.clone()).unwrap();
        let decomposed = run("md mv md", input).unwrap();
        assert_eq!(direct, decomposed);
        assert_eq!(direct, bits("01/10"));
    }

    #[test]
    fn test_row_fold_scenario() {
        assert_eq!(run("&&r", bits("11/10")).unwrap(), bits("1/0"));
    }

    #[test]
    fn test_store_load_roundtrip() {
        let out = run("#10 >A #01 ^ (A)", bits("0")).unwrap();
        assert_eq!(out, bits("11"));
    }

    #[test]
    fn test_store_keeps_focus() {
        let out = run("#10 >A", bits("0")).unwrap();
        assert_eq!(out, bits("10"));
    }

    #[test]
    fn test_not_and_masks() {
        assert_eq!(run("~", bits("10/01")).unwrap(), bits("01/10"));
        assert_eq!(run("^ (#11/11)", bits("10/01")).unwrap(), bits("01/10"));
        assert_eq!(run("& (#10/10)", bits("11/01")).unwrap(), bits("10/00"));
        assert_eq!(run("| (#10/10)", bits("01/01")).unwrap(), bits("11/11"));
    }

    #[test]
    fn test_equals_instruction() {
        assert_eq!(run("= (#10/01)", bits("10/01")).unwrap(), bits("1"));
        assert_eq!(run("= (#10/00)", bits("10/01")).unwrap(), bits("0"));
        assert_eq!(run("= (#10)", bits("10/01")).unwrap(), bits("0"));
    }

    #[test]
    fn test_append_instruction() {
        assert_eq!(run("ab (#01)", bits("10")).unwrap(), bits("10/01"));
        assert_eq!(
            run("ab (#011)", bits("10")),
            Err(RunError::Dimension(DimensionMismatch { left: 2, right: 3 }))
        );
    }

    #[test]
    fn test_moves_through_interpreter() {
        assert_eq!(run("tt2", bits("10/01/11")).unwrap(), bits("10/01"));
        assert_eq!(run("db1", bits("10/01/11")).unwrap(), bits("10/01"));
        assert_eq!(run("cb2", bits("10")).unwrap(), bits("10/10"));
        assert_eq!(run("xb1", bits("10")).unwrap(), bits("10/00"));
        assert_eq!(run("sb1", bits("10/01")).unwrap(), bits("00/10"));
        assert_eq!(run("rb1", bits("10/01")).unwrap(), bits("01/10"));
    }

    #[test]
    fn test_undefined_board_is_fatal() {
        assert_eq!(
            run("Ghost", bits("0")),
            Err(RunError::UndefinedBoard("Ghost".to_string()))
        );
        assert_eq!(
            run("& (Ghost)", bits("0")),
            Err(RunError::UndefinedBoard("Ghost".to_string()))
        );
    }

    #[test]
    fn test_missing_operand_is_fatal() {
        assert!(matches!(
            run("&", bits("0")),
            Err(RunError::MissingOperand(_))
        ));
        assert!(matches!(
            run("ab", bits("0")),
            Err(RunError::MissingOperand(_))
        ));
    }

    #[test]
    fn test_repeat_is_not_executable() {
        assert!(matches!(
            run("2x { ~ }", bits("0")),
            Err(RunError::NotExecutable(_))
        ));
    }
}
