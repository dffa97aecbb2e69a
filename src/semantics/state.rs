//! Named-board state threaded through a single interpreter run

use std::collections::HashMap;

use crate::board::{Board, CellDomain};

/// Interpreter state: the focus board plus the named boards
///
/// Created per run and discarded afterwards; runs never share state. The
/// focus is the implicit operand of most instructions and the only entry
/// that exists from the start.
#[derive(Debug, Clone)]
pub struct ExecState<T: CellDomain> {
    pub focus: Board<T>,
    named: HashMap<String, Board<T>>,
}

impl<T: CellDomain> ExecState<T> {
    /// Fresh state with `input` as the focus and no named boards
    pub fn new(input: Board<T>) -> Self {
        Self {
            focus: input,
            named: HashMap::new(),
        }
    }

    /// Store a board under a name, replacing any previous binding
    pub fn store(&mut self, name: &str, board: Board<T>) {
        self.named.insert(name.to_string(), board);
    }

    /// Look up a named board
    pub fn load(&self, name: &str) -> Option<&Board<T>> {
        self.named.get(name)
    }

    /// Named boards in name order, for display
    pub fn named_boards(&self) -> Vec<(&str, &Board<T>)> {
        let mut entries: Vec<_> = self
            .named
            .iter()
            .map(|(name, board)| (name.as_str(), board))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }
}
