//! Dependency tracking for derived columns

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::symbol::Symbol;

/// A dependency cycle, listed from its first member back to that member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    pub cycle: Vec<Symbol>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.cycle.iter().map(Symbol::name).collect();
        f.write_str(&names.join(" -> "))
    }
}

impl std::error::Error for CycleError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Dependency graph between column symbols
///
/// Tracks which symbols are computed from which others, enabling an update
/// order where every column comes after all of its sources.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Nodes in insertion order
    nodes: Vec<Symbol>,
    /// Symbol → symbols it is computed from (precedents)
    precedents: BTreeMap<Symbol, BTreeSet<Symbol>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node without dependencies; repeated calls are no-ops
    pub fn add_node(&mut self, symbol: Symbol) {
        if !self.contains(&symbol) {
            self.nodes.push(symbol);
        }
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.nodes.contains(symbol)
    }

    /// Add a dependency: dependent is computed from precedent
    pub fn add_dependency(&mut self, precedent: Symbol, dependent: Symbol) {
        self.add_node(precedent.clone());
        self.add_node(dependent.clone());
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Get symbols the given symbol is computed from
    pub fn get_precedents<'a>(&'a self, symbol: &Symbol) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.precedents.get(symbol).into_iter().flatten()
    }

    /// All nodes ordered so that each comes after its precedents
    ///
    /// Three-colour DFS over the precedent edges, starting from the nodes in
    /// insertion order. The first cycle found is reported.
    pub fn calculation_order(&self) -> Result<Vec<Symbol>, CycleError> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut marks = BTreeMap::new();
        let mut stack = Vec::new();

        for node in &self.nodes {
            self.visit(node, &mut marks, &mut stack, &mut result)?;
        }

        Ok(result)
    }

    fn visit(
        &self,
        symbol: &Symbol,
        marks: &mut BTreeMap<Symbol, Mark>,
        stack: &mut Vec<Symbol>,
        result: &mut Vec<Symbol>,
    ) -> Result<(), CycleError> {
        match marks.get(symbol) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = stack.iter().position(|s| s == symbol).unwrap_or(0);
                let mut cycle = stack[start..].to_vec();
                cycle.push(symbol.clone());
                return Err(CycleError { cycle });
            }
            None => {}
        }

        marks.insert(symbol.clone(), Mark::InProgress);
        stack.push(symbol.clone());

        for precedent in self.get_precedents(symbol) {
            self.visit(precedent, marks, stack, result)?;
        }

        stack.pop();
        marks.insert(symbol.clone(), Mark::Done);
        result.push(symbol.clone());
        Ok(())
    }
}
