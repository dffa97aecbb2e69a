//! Symbolic cell domain and graph building
//!
//! Running the ordinary interpreter over a board whose every cell is a
//! fresh variable node (the "radioactive" input) yields an output board
//! whose cells reference a DAG of boolean operation nodes. The arena owns
//! the nodes of one run; ids are handed out in strictly increasing order,
//! so a node's operands always carry smaller ids and sorting by id is a
//! topological order.

use std::collections::HashSet;
use std::fmt;

use log::debug;

use crate::board::{Board, CellDomain};
use crate::ir::Instruction;
use crate::semantics::interp::{run_program, RunError};

/// Identifier of a node within one arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One boolean operation node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeExpr {
    /// Input variable, tagged with its linear cell index `i * width + j`
    Var(usize),
    And(NodeId, NodeId),
    Or(NodeId, NodeId),
    Xor(NodeId, NodeId),
    Not(NodeId),
}

/// Node storage for a single graph-building run
///
/// Each run owns its arena; nothing is shared across runs, so concurrent
/// or repeated checks cannot cross-contaminate identifiers.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<NodeExpr>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node; ids increase strictly with allocation order
    pub fn push(&mut self, expr: NodeExpr) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(expr);
        id
    }

    pub fn expr(&self, id: NodeId) -> NodeExpr {
        self.nodes[id.index()]
    }
}

/// Cell of a symbolic board: a concrete constant or a node reference
///
/// Sharing is by node identity: two cells holding the same `NodeId` share
/// one node, while structurally equal nodes built separately stay separate
/// (no structural hash-consing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sym {
    Const(bool),
    Node(NodeId),
}

impl CellDomain for Sym {
    type Ctx = NodeArena;

    fn zero() -> Self {
        Sym::Const(false)
    }

    fn one() -> Self {
        Sym::Const(true)
    }

    // Constant operands are absorbed eagerly: a binary node is only
    // materialized when neither operand is a constant.

    fn and(arena: &mut NodeArena, a: &Self, b: &Self) -> Self {
        match (a, b) {
            (Sym::Const(false), _) | (_, Sym::Const(false)) => Sym::Const(false),
            (Sym::Const(true), x) | (x, Sym::Const(true)) => *x,
            (Sym::Node(a), Sym::Node(b)) => Sym::Node(arena.push(NodeExpr::And(*a, *b))),
        }
    }

    fn or(arena: &mut NodeArena, a: &Self, b: &Self) -> Self {
        match (a, b) {
            (Sym::Const(true), _) | (_, Sym::Const(true)) => Sym::Const(true),
            (Sym::Const(false), x) | (x, Sym::Const(false)) => *x,
            (Sym::Node(a), Sym::Node(b)) => Sym::Node(arena.push(NodeExpr::Or(*a, *b))),
        }
    }

    fn xor(arena: &mut NodeArena, a: &Self, b: &Self) -> Self {
        match (a, b) {
            (Sym::Const(a), Sym::Const(b)) => Sym::Const(a != b),
            (Sym::Const(false), x) | (x, Sym::Const(false)) => *x,
            (Sym::Const(true), Sym::Node(n)) | (Sym::Node(n), Sym::Const(true)) => {
                Sym::Node(arena.push(NodeExpr::Not(*n)))
            }
            (Sym::Node(a), Sym::Node(b)) => Sym::Node(arena.push(NodeExpr::Xor(*a, *b))),
        }
    }

    fn not(arena: &mut NodeArena, a: &Self) -> Self {
        match a {
            Sym::Const(bit) => Sym::Const(!bit),
            Sym::Node(n) => Sym::Node(arena.push(NodeExpr::Not(*n))),
        }
    }
}

/// Input board whose every cell is a distinct fresh variable node
pub fn radioactive_board(height: usize, width: usize, arena: &mut NodeArena) -> Board<Sym> {
    Board::plot(height, width, |i, j| {
        Sym::Node(arena.push(NodeExpr::Var(i * width + j)))
    })
}

/// Result of running a program symbolically
#[derive(Debug)]
pub struct SymbolicTrace {
    pub arena: NodeArena,
    /// The radioactive input the program ran against
    pub input: Board<Sym>,
    /// Final focus: constants and node references over the arena
    pub output: Board<Sym>,
    /// Reachable nodes in id order (a topological order by construction)
    pub order: Vec<NodeId>,
}

/// Run `program` against a fresh radioactive input of the given size
pub fn build_trace(
    program: &[Instruction],
    height: usize,
    width: usize,
) -> Result<SymbolicTrace, RunError> {
    let mut arena = NodeArena::new();
    let input = radioactive_board(height, width, &mut arena);
    let state = run_program(program, input.clone(), &mut arena)?;
    let output = state.focus;
    let order = trace_nodes(&output, &arena);
    debug!(
        "traced {} of {} nodes for a {}x{} input",
        order.len(),
        arena.len(),
        height,
        width
    );
    Ok(SymbolicTrace {
        arena,
        input,
        output,
        order,
    })
}

/// Collect every node reachable from the output cells, in id order
///
/// Depth-first over node operand edges, visiting each node at most once.
/// Child ids are always smaller than parent ids, so the ascending sort at
/// the end is a valid topological order.
pub fn trace_nodes(output: &Board<Sym>, arena: &NodeArena) -> Vec<NodeId> {
    let mut stack: Vec<NodeId> = output
        .rows()
        .flatten()
        .filter_map(|cell| match cell {
            Sym::Node(id) => Some(*id),
            Sym::Const(_) => None,
        })
        .collect();
    let mut seen: HashSet<NodeId> = HashSet::new();

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        match arena.expr(id) {
            NodeExpr::Var(_) => {}
            NodeExpr::Not(a) => stack.push(a),
            NodeExpr::And(a, b) | NodeExpr::Or(a, b) | NodeExpr::Xor(a, b) => {
                stack.push(a);
                stack.push(b);
            }
        }
    }

    let mut order: Vec<NodeId> = seen.into_iter().collect();
    order.sort();
    order
}
