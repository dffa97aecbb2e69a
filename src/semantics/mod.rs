//! Execution, symbolic tracing, and equivalence checking for board programs

pub mod codegen;
pub mod equivalence;
pub mod interp;
pub mod state;
pub mod symbolic;

// Re-export main functionality
pub use codegen::{compile_trace, CompiledProgram};
pub use equivalence::{
    check_equivalence, check_equivalence_interpreted, EquivSide, EquivalenceResult,
};
pub use interp::{run_program, RunError};
pub use state::ExecState;
pub use symbolic::{build_trace, SymbolicTrace};
