//! Flattening a symbolic trace into a linear op tape
//!
//! The tape holds one assignment per reachable node, in topological (id)
//! order, followed by one assignment per output cell. It is evaluated
//! directly against packed input bits; the name prefix only matters for
//! the printable listing, where two tapes may be shown side by side.

use std::fmt;

use crate::board::Board;
use crate::semantics::interp::RunError;
use crate::semantics::symbolic::{NodeExpr, NodeId, Sym, SymbolicTrace};

/// One tape assignment: the operation computing a node's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    /// Read the input bit at (row, col)
    Input { row: usize, col: usize },
    And(NodeId, NodeId),
    Or(NodeId, NodeId),
    Xor(NodeId, NodeId),
    Not(NodeId),
}

/// Source of an output cell's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRef {
    Node(NodeId),
    /// Constant folded away during graph construction
    Const(bool),
}

/// A flattened, directly evaluable rendition of one symbolic trace
#[derive(Debug)]
pub struct CompiledProgram {
    prefix: String,
    input_width: usize,
    output_height: usize,
    output_width: usize,
    ops: Vec<(NodeId, OpCode)>,
    outputs: Vec<CellRef>,
    /// Scratch size needed to evaluate; covers every allocated node id
    slots: usize,
}

/// Serialize a trace into a tape
///
/// Variable nodes are resolved to input coordinates by structural match
/// against the radioactive input board, failing if no cell matches.
pub fn compile_trace(trace: &SymbolicTrace, prefix: &str) -> Result<CompiledProgram, RunError> {
    let mut ops = Vec::with_capacity(trace.order.len());
    for &id in &trace.order {
        let op = match trace.arena.expr(id) {
            NodeExpr::Var(index) => {
                let (row, col) =
                    find_input_cell(trace, index).ok_or(RunError::UnmappedInput { index })?;
                OpCode::Input { row, col }
            }
            NodeExpr::And(a, b) => OpCode::And(a, b),
            NodeExpr::Or(a, b) => OpCode::Or(a, b),
            NodeExpr::Xor(a, b) => OpCode::Xor(a, b),
            NodeExpr::Not(a) => OpCode::Not(a),
        };
        ops.push((id, op));
    }

    let outputs = trace
        .output
        .rows()
        .flatten()
        .map(|cell| match cell {
            Sym::Node(id) => CellRef::Node(*id),
            Sym::Const(bit) => CellRef::Const(*bit),
        })
        .collect();

    Ok(CompiledProgram {
        prefix: prefix.to_string(),
        input_width: trace.input.width(),
        output_height: trace.output.height(),
        output_width: trace.output.width(),
        ops,
        outputs,
        slots: trace.arena.len(),
    })
}

fn find_input_cell(trace: &SymbolicTrace, index: usize) -> Option<(usize, usize)> {
    for i in 0..trace.input.height() {
        for j in 0..trace.input.width() {
            if let Sym::Node(id) = trace.input.at(i, j) {
                if trace.arena.expr(*id) == NodeExpr::Var(index) {
                    return Some((i, j));
                }
            }
        }
    }
    None
}

impl CompiledProgram {
    /// Scratch slot count required by [`eval_slots`](Self::eval_slots)
    pub fn slot_count(&self) -> usize {
        self.slots
    }

    pub fn output_size(&self) -> (usize, usize) {
        (self.output_height, self.output_width)
    }

    pub fn output_len(&self) -> usize {
        self.outputs.len()
    }

    /// Evaluate the tape; bit `k` of `bits` feeds the input cell with
    /// linear index `k`
    pub fn eval_slots(&self, bits: u64, slots: &mut [bool]) {
        for &(id, op) in &self.ops {
            let value = match op {
                OpCode::Input { row, col } => bits >> (row * self.input_width + col) & 1 == 1,
                OpCode::And(a, b) => slots[a.index()] && slots[b.index()],
                OpCode::Or(a, b) => slots[a.index()] || slots[b.index()],
                OpCode::Xor(a, b) => slots[a.index()] != slots[b.index()],
                OpCode::Not(a) => !slots[a.index()],
            };
            slots[id.index()] = value;
        }
    }

    /// Value of output cell `index` after [`eval_slots`](Self::eval_slots)
    pub fn output_bit(&self, index: usize, slots: &[bool]) -> bool {
        match self.outputs[index] {
            CellRef::Node(id) => slots[id.index()],
            CellRef::Const(bit) => bit,
        }
    }

    /// Collect the full output board after [`eval_slots`](Self::eval_slots)
    pub fn output_board(&self, slots: &[bool]) -> Board<bool> {
        Board::plot(self.output_height, self.output_width, |i, j| {
            self.output_bit(i * self.output_width + j, slots)
        })
    }
}

impl fmt::Display for CompiledProgram {
    /// Assignment listing, one line per tape entry
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.prefix;
        for &(id, op) in &self.ops {
            match op {
                OpCode::Input { row, col } => writeln!(f, "{}{} = in_{}_{}", p, id, row, col)?,
                OpCode::And(a, b) => writeln!(f, "{}{} = {}{} & {}{}", p, id, p, a, p, b)?,
                OpCode::Or(a, b) => writeln!(f, "{}{} = {}{} | {}{}", p, id, p, a, p, b)?,
                OpCode::Xor(a, b) => writeln!(f, "{}{} = {}{} ^ {}{}", p, id, p, a, p, b)?,
                OpCode::Not(a) => writeln!(f, "{}{} = ~ {}{}", p, id, p, a)?,
            }
        }
        for (index, out) in self.outputs.iter().enumerate() {
            let row = index / self.output_width;
            let col = index % self.output_width;
            match out {
                CellRef::Node(id) => writeln!(f, "{}out_{}_{} = {}{}", p, row, col, p, id)?,
                CellRef::Const(bit) => {
                    writeln!(f, "{}out_{}_{} = {}", p, row, col, u8::from(*bit))?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;
    use crate::semantics::interp::run_program;
    use crate::semantics::symbolic::{build_trace, radioactive_board, trace_nodes, NodeArena};

    fn compile(source: &str, height: usize, width: usize) -> CompiledProgram {
        let program = parse_program(source).expect("test program parses");
        let trace = build_trace(&program, height, width).expect("trace builds");
        compile_trace(&trace, "a_").expect("tape compiles")
    }

    #[test]
    fn test_identity_listing() {
        let tape = compile("", 1, 2);
        assert_eq!(
            format!("{}", tape),
            "a_v0 = in_0_0\na_v1 = in_0_1\na_out_0_0 = a_v0\na_out_0_1 = a_v1\n"
        );
    }

    #[test]
    fn test_constant_output_listing() {
        let tape = compile("& (o1x1)", 1, 1);
        assert_eq!(format!("{}", tape), "a_out_0_0 = 0\n");
    }

    #[test]
    fn test_not_listing_uses_prefix() {
        let tape = compile("~", 1, 1);
        assert_eq!(
            format!("{}", tape),
            "a_v0 = in_0_0\na_v1 = ~ a_v0\na_out_0_0 = a_v1\n"
        );
    }

    #[test]
    fn test_eval_agrees_with_interpreter() {
        let source = "^ (#101/010) >A mv & (A) ||l";
        let program = parse_program(source).expect("parses");
        let trace = build_trace(&program, 2, 3).expect("trace builds");
        let tape = compile_trace(&trace, "t_").expect("compiles");
        let mut slots = vec![false; tape.slot_count()];

        for bits in 0..(1u64 << 6) {
            let input = Board::plot(2, 3, |i, j| bits >> (i * 3 + j) & 1 == 1);
            let expected = run_program(&program, input, &mut ())
                .expect("concrete run succeeds")
                .focus;
            tape.eval_slots(bits, &mut slots);
            assert_eq!(tape.output_board(&slots), expected, "bits={:#b}", bits);
        }
    }

    #[test]
    fn test_unmatched_variable_fails() {
        // Hand-build a trace whose output references a variable that the
        // input board does not contain.
        let mut arena = NodeArena::new();
        let input = radioactive_board(1, 1, &mut arena);
        let stray = arena.push(crate::semantics::symbolic::NodeExpr::Var(7));
        let output = Board::plot(1, 1, |_, _| Sym::Node(stray));
        let order = trace_nodes(&output, &arena);
        let trace = SymbolicTrace {
            arena,
            input,
            output,
            order,
        };
        assert_eq!(
            compile_trace(&trace, "a_").unwrap_err(),
            RunError::UnmappedInput { index: 7 }
        );
    }
}
