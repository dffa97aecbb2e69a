//! Core types for the board-transformation IR

use std::fmt;

use crate::board::Board;

/// Edge of the board a directional operation works against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    /// Create a direction from its one-letter DSL code
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'l' => Some(Direction::Left),
            'r' => Some(Direction::Right),
            't' => Some(Direction::Top),
            'b' => Some(Direction::Bottom),
            _ => None,
        }
    }

    /// One-letter DSL code of this direction
    pub fn code(&self) -> char {
        match self {
            Direction::Left => 'l',
            Direction::Right => 'r',
            Direction::Top => 't',
            Direction::Bottom => 'b',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The eight dihedral transforms of a rectangular board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// `i`: leave the board as is
    Identity,
    /// `v`: reverse the row order (flip upside down)
    FlipVertical,
    /// `d`: mirror across the main diagonal
    Transpose,
    /// `h`: reverse each row (flip left to right)
    FlipHorizontal,
    /// `c`: rotate a quarter turn clockwise
    RotateCw,
    /// `a`: rotate a quarter turn counterclockwise
    RotateCcw,
    /// `u`: rotate a half turn
    Rotate180,
    /// `z`: mirror across the anti-diagonal
    AntiTranspose,
}

impl Transform {
    /// Create a transform from its one-letter DSL code
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'i' => Some(Transform::Identity),
            'v' => Some(Transform::FlipVertical),
            'd' => Some(Transform::Transpose),
            'h' => Some(Transform::FlipHorizontal),
            'c' => Some(Transform::RotateCw),
            'a' => Some(Transform::RotateCcw),
            'u' => Some(Transform::Rotate180),
            'z' => Some(Transform::AntiTranspose),
            _ => None,
        }
    }

    /// One-letter DSL code of this transform
    pub fn code(&self) -> char {
        match self {
            Transform::Identity => 'i',
            Transform::FlipVertical => 'v',
            Transform::Transpose => 'd',
            Transform::FlipHorizontal => 'h',
            Transform::RotateCw => 'c',
            Transform::RotateCcw => 'a',
            Transform::Rotate180 => 'u',
            Transform::AntiTranspose => 'z',
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Bitwise operation used both cellwise and as a row fold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitOp {
    And,
    Or,
    Xor,
}

impl fmt::Display for BitOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitOp::And => write!(f, "&"),
            BitOp::Or => write!(f, "|"),
            BitOp::Xor => write!(f, "^"),
        }
    }
}

/// Directional transform family selected by the leading command letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveOp {
    /// `t`: keep the first `n` rows measured from the edge
    Take,
    /// `d`: drop the last `n` rows measured from the edge
    Delete,
    /// `c`: replicate the board `n` times toward the edge
    Copy,
    /// `x`: pad with `n` zero rows at the edge
    Extend,
    /// `s`: shift rows by `n` toward the edge, vacated rows zero
    Shift,
    /// `r`: rotate rows by `n` toward the edge, wrapping
    Roll,
}

impl MoveOp {
    /// Create a move op from its one-letter DSL code
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            't' => Some(MoveOp::Take),
            'd' => Some(MoveOp::Delete),
            'c' => Some(MoveOp::Copy),
            'x' => Some(MoveOp::Extend),
            's' => Some(MoveOp::Shift),
            'r' => Some(MoveOp::Roll),
            _ => None,
        }
    }

    /// One-letter DSL code of this move op
    pub fn code(&self) -> char {
        match self {
            MoveOp::Take => 't',
            MoveOp::Delete => 'd',
            MoveOp::Copy => 'c',
            MoveOp::Extend => 'x',
            MoveOp::Shift => 's',
            MoveOp::Roll => 'r',
        }
    }
}

impl fmt::Display for MoveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Operand of a bitwise, equality, or append instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// An inline board literal
    Literal(Board<bool>),
    /// A reference to a named board in the interpreter state
    Named(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(board) => write!(f, "{}", board),
            Operand::Named(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_roundtrip() {
        for code in ['l', 'r', 't', 'b'] {
            let dir = Direction::from_code(code).unwrap();
            assert_eq!(dir.code(), code);
        }
        assert_eq!(Direction::from_code('a'), None);
    }

    #[test]
    fn test_transform_roundtrip() {
        for code in ['i', 'v', 'd', 'h', 'c', 'a', 'u', 'z'] {
            let tf = Transform::from_code(code).unwrap();
            assert_eq!(tf.code(), code);
        }
        assert_eq!(Transform::from_code('q'), None);
    }

    #[test]
    fn test_move_op_roundtrip() {
        for code in ['t', 'd', 'c', 'x', 's', 'r'] {
            let op = MoveOp::from_code(code).unwrap();
            assert_eq!(op.code(), code);
        }
        assert_eq!(MoveOp::from_code('m'), None);
    }

    #[test]
    fn test_operand_display() {
        assert_eq!(format!("{}", Operand::Named("Saved".to_string())), "Saved");
    }
}
