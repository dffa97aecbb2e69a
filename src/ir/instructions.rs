//! Instruction definitions for the board DSL

use std::fmt;

use crate::board::Board;
use crate::ir::types::{BitOp, Direction, MoveOp, Operand, Transform};

/// One straight-line instruction of a DSL program
///
/// A program is an ordered `Vec<Instruction>` with no control flow; every
/// instruction reads some of the named-board state (usually the focus) and
/// writes exactly one entry back.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Replace the focus with a literal board
    Literal(Board<bool>),
    /// Replace the focus with a named board
    Load(String),
    /// Store the focus under a name, focus unchanged
    Store(String),
    /// Bitwise NOT of the focus
    Not,
    /// Cellwise combination of the focus with an operand board
    Bitwise { op: BitOp, operand: Option<Operand> },
    /// Whole-board equality against an operand, producing a 1x1 board
    Equals { operand: Option<Operand> },
    /// Fold each row down to one cell, under a direction
    RowFold { op: BitOp, dir: Direction },
    /// Directional transform family (take/delete/copy/extend/shift/roll)
    Move {
        op: MoveOp,
        dir: Direction,
        count: usize,
    },
    /// Concatenate an operand board onto the focus along an edge
    Append {
        dir: Direction,
        operand: Option<Operand>,
    },
    /// One of the eight dihedral transforms
    Transform(Transform),
    /// Repeat wrapper; parsed but not executable
    Repeat {
        count: usize,
        body: Vec<Instruction>,
    },
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Option<Operand>) -> fmt::Result {
    if let Some(operand) = operand {
        write!(f, " ({})", operand)?;
    }
    Ok(())
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Literal(board) => write!(f, "{}", board),
            Instruction::Load(name) => write!(f, "{}", name),
            Instruction::Store(name) => write!(f, ">{}", name),
            Instruction::Not => write!(f, "~"),
            Instruction::Bitwise { op, operand } => {
                write!(f, "{}", op)?;
                write_operand(f, operand)
            }
            Instruction::Equals { operand } => {
                write!(f, "=")?;
                write_operand(f, operand)
            }
            Instruction::RowFold { op, dir } => write!(f, "{}{}{}", op, op, dir),
            Instruction::Move { op, dir, count } => {
                write!(f, "{}{}", op, dir)?;
                if *count > 0 {
                    write!(f, "{}", count)?;
                }
                Ok(())
            }
            Instruction::Append { dir, operand } => {
                write!(f, "a{}", dir)?;
                write_operand(f, operand)
            }
            Instruction::Transform(tf) => write!(f, "m{}", tf),
            Instruction::Repeat { count, body } => {
                write!(f, "{}x {{", count)?;
                for instr in body {
                    write!(f, " {}", instr)?;
                }
                write!(f, " }}")
            }
        }
    }
}
