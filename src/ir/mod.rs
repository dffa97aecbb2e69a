//! Intermediate Representation (IR) for board DSL programs

pub mod instructions;
pub mod types;

// Re-export commonly used types
pub use instructions::Instruction;
pub use types::{BitOp, Direction, MoveOp, Operand, Transform};
