//! Tables of columns
//!
//! A [`Table`] owns its columns and addresses them by [`Symbol`]; derived
//! columns refer to their sources by symbol only. Columns are never removed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ahash::AHashMap;
use praktool_formula::{
    default_registry, dimension_of, is_math_constant, parse_expression, DependencyGraph, Expr,
    Quantity, Symbol, Unit, UnitRegistry,
};

use crate::column::Column;
use crate::derivation::evaluate_rows;
use crate::error::{Error, Result};
use crate::uncertainty::{Attachments, UncertaintyKind};

/// Something that identifies a column of a table: a [`Symbol`] or a display name
pub trait ColumnKey {
    /// Symbol of the column this key refers to, if it exists in `table`
    fn lookup(&self, table: &Table) -> Option<Symbol>;

    /// Name used in error messages
    fn display_name(&self) -> String;
}

impl ColumnKey for Symbol {
    fn lookup(&self, table: &Table) -> Option<Symbol> {
        table.columns.contains_key(self).then(|| self.clone())
    }

    fn display_name(&self) -> String {
        self.to_string()
    }
}

impl ColumnKey for str {
    fn lookup(&self, table: &Table) -> Option<Symbol> {
        table.symbol_names.get(self).cloned()
    }

    fn display_name(&self) -> String {
        self.to_string()
    }
}

impl ColumnKey for String {
    fn lookup(&self, table: &Table) -> Option<Symbol> {
        self.as_str().lookup(table)
    }

    fn display_name(&self) -> String {
        self.clone()
    }
}

impl<K: ColumnKey + ?Sized> ColumnKey for &K {
    fn lookup(&self, table: &Table) -> Option<Symbol> {
        (**self).lookup(table)
    }

    fn display_name(&self) -> String {
        (**self).display_name()
    }
}

/// Statistics from an [`Table::update_all`] run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Number of columns visited in dependency order
    pub columns_visited: usize,
    /// Number of derived columns recomputed
    pub columns_updated: usize,
    /// Total number of rows computed
    pub rows_computed: usize,
}

/// A collection of uniquely named columns
#[derive(Debug, Clone)]
pub struct Table {
    columns: AHashMap<Symbol, Column>,
    symbol_names: AHashMap<String, Symbol>,
    /// Expression variable of each column
    var_names: AHashMap<String, Symbol>,
    order: Vec<Symbol>,
    registry: Arc<UnitRegistry>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    /// Create an empty table using the shared SI unit registry
    pub fn new() -> Self {
        Self::with_registry(default_registry())
    }

    /// Create an empty table that resolves units with `registry`
    pub fn with_registry(registry: Arc<UnitRegistry>) -> Self {
        Self {
            columns: AHashMap::new(),
            symbol_names: AHashMap::new(),
            var_names: AHashMap::new(),
            order: Vec::new(),
            registry,
        }
    }

    /// Create a table from ready-made columns
    pub fn from_columns(columns: impl IntoIterator<Item = Column>) -> Result<Self> {
        let mut table = Self::new();
        for column in columns {
            table.add(column)?;
        }
        Ok(table)
    }

    pub fn registry(&self) -> &Arc<UnitRegistry> {
        &self.registry
    }

    /// Register a column
    pub fn add(&mut self, column: Column) -> Result<&mut Column> {
        let symbol = column.symbol().clone();
        if self.columns.contains_key(&symbol) || self.symbol_names.contains_key(symbol.name()) {
            return Err(Error::DuplicateSymbol(symbol.to_string()));
        }

        tracing::trace!("Adding {} column {}", column.kind().name(), symbol);
        self.symbol_names
            .insert(symbol.name().to_string(), symbol.clone());
        self.var_names.insert(symbol.var_name(), symbol.clone());
        self.order.push(symbol.clone());
        Ok(self.columns.entry(symbol).or_insert(column))
    }

    pub fn get(&self, key: impl ColumnKey) -> Option<&Column> {
        let symbol = key.lookup(self)?;
        self.columns.get(&symbol)
    }

    pub fn get_mut(&mut self, key: impl ColumnKey) -> Option<&mut Column> {
        let symbol = key.lookup(self)?;
        self.columns.get_mut(&symbol)
    }

    /// Like [`Table::get`], failing with [`Error::UnknownColumn`]
    pub fn column(&self, key: impl ColumnKey) -> Result<&Column> {
        self.get(&key)
            .ok_or_else(|| Error::UnknownColumn(key.display_name()))
    }

    pub fn column_mut(&mut self, key: impl ColumnKey) -> Result<&mut Column> {
        let symbol = self.symbol(&key)?;
        self.columns
            .get_mut(&symbol)
            .ok_or_else(|| Error::UnknownColumn(key.display_name()))
    }

    /// Symbol of an existing column
    pub fn symbol(&self, key: impl ColumnKey) -> Result<Symbol> {
        key.lookup(self)
            .ok_or_else(|| Error::UnknownColumn(key.display_name()))
    }

    pub fn contains(&self, key: impl ColumnKey) -> bool {
        key.lookup(self).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Symbols in the order the columns were added
    pub fn symbols(&self) -> &[Symbol] {
        &self.order
    }

    /// Columns in the order they were added
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.order.iter().filter_map(|symbol| self.columns.get(symbol))
    }

    // === Formulas ===

    /// Parse unit text with the table's registry
    pub fn unit(&self, text: &str) -> Result<Unit> {
        Ok(self.registry.parse_unit(text)?)
    }

    /// Parse a formula over the columns of this table
    ///
    /// Every name must be a column, a registry unit or constant, or one of
    /// the math constants `pi` and `e`; anything else is an
    /// [`Error::UnknownSymbol`]. Columns shadow units of the same name.
    pub fn parse_formula(&self, text: &str) -> Result<Expr> {
        let expr = parse_expression(text)?;
        let unknown = expr
            .variables()
            .into_iter()
            .filter(|name| {
                !self.var_names.contains_key(name)
                    && !is_math_constant(name)
                    && !self.registry.contains(name)
            })
            .min();
        match unknown {
            Some(name) => Err(Error::UnknownSymbol(name)),
            None => Ok(expr),
        }
    }

    /// Register a derived column computing `expression` in `unit`
    ///
    /// Names in the expression resolve to columns of this table first, then
    /// to registry units and constants. A name that is neither is an
    /// [`Error::UnknownSymbol`]. The dimension of the expression must match
    /// the dimension of `unit`. The column starts out empty; see
    /// [`Table::update`].
    pub fn derivate(
        &mut self,
        symbol: impl Into<Symbol>,
        unit: Unit,
        expression: Expr,
    ) -> Result<&mut Column> {
        let symbol = symbol.into();
        if self.contains(&symbol) || self.symbol_names.contains_key(symbol.name()) {
            return Err(Error::DuplicateSymbol(symbol.to_string()));
        }

        let mut sources = BTreeSet::new();
        let mut leaves = BTreeMap::new();
        let names: BTreeSet<String> = expression.variables().into_iter().collect();
        for name in names {
            if let Some(source) = self.var_names.get(&name) {
                if is_math_constant(&name) {
                    return Err(Error::InvalidFormula {
                        column: symbol.to_string(),
                        reason: format!("column '{}' is shadowed by the math constant", name),
                    });
                }
                sources.insert(source.clone());
            } else if is_math_constant(&name) {
                continue;
            } else if let Some(quantity) = self.registry.get(&name) {
                if !self.registry.is_constant(&name) {
                    tracing::warn!(
                        "{}: '{}' is not a column, reading it as the unit {}",
                        symbol,
                        name,
                        name
                    );
                }
                leaves.insert(name, quantity);
            } else {
                return Err(Error::UnknownSymbol(name));
            }
        }
        if sources.is_empty() {
            return Err(Error::InvalidFormula {
                column: symbol.to_string(),
                reason: format!("'{}' references no column, use a constant column", expression),
            });
        }

        let dimension = dimension_of(&expression, |name| {
            match self.var_names.get(name) {
                Some(source) => self.columns.get(source).map(|c| c.unit().dimension()),
                None => leaves.get(name).map(Quantity::dimension),
            }
        })?;
        if !dimension.is_compatible(&unit.dimension()) {
            return Err(Error::IncompatibleUnit {
                column: symbol.to_string(),
                expected: unit.dimension().to_string(),
                found: dimension.to_string(),
            });
        }

        tracing::debug!("Derivating {} [{}] = {}", symbol, unit, expression);
        self.add(Column::derived(symbol, unit, sources, expression).with_unit_leaves(leaves))
    }

    /// Parse `unit` and `formula` and register the derived column `name`
    pub fn derivate_formula(&mut self, name: &str, unit: &str, formula: &str) -> Result<&mut Column> {
        let unit = self.unit(unit)?;
        let expression = self.parse_formula(formula)?;
        self.derivate(name, unit, expression)
    }

    /// Register a constant column of `length` rows
    pub fn add_constant(
        &mut self,
        symbol: impl Into<Symbol>,
        unit: Unit,
        value: Quantity,
        errors: &BTreeMap<UncertaintyKind, Quantity>,
        length: usize,
    ) -> Result<&mut Column> {
        let column = Column::constant(symbol, unit, value, errors, length)?;
        self.add(column)
    }

    // === Updating ===

    /// Recompute a derived column
    ///
    /// With `force_deep`, every source is recomputed recursively first;
    /// otherwise only sources that are still empty are. Updating a
    /// measurement or constant column does nothing.
    pub fn update(&mut self, key: impl ColumnKey, force_deep: bool) -> Result<()> {
        let symbol = self.symbol(&key)?;
        let mut stack = Vec::new();
        self.update_recursive(&symbol, force_deep, &mut stack)
    }

    fn update_recursive(
        &mut self,
        symbol: &Symbol,
        force_deep: bool,
        stack: &mut Vec<Symbol>,
    ) -> Result<()> {
        if let Some(start) = stack.iter().position(|s| s == symbol) {
            let mut cycle: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
            cycle.push(symbol.to_string());
            return Err(Error::CyclicReference { cycle });
        }

        let column = self
            .columns
            .get(symbol)
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_string()))?;
        if !column.is_derived() {
            return Ok(());
        }
        let sources: Vec<Symbol> = column.sources().cloned().collect();

        stack.push(symbol.clone());
        for source in &sources {
            let source_column = self
                .columns
                .get(source)
                .ok_or_else(|| Error::UnknownSymbol(source.to_string()))?;
            if force_deep || source_column.is_empty() {
                self.update_recursive(source, force_deep, stack)?;
            }
        }
        stack.pop();

        self.recompute(symbol).map(|_| ())
    }

    /// Recompute one derived column from the current source contents
    ///
    /// Returns the number of rows computed.
    fn recompute(&mut self, symbol: &Symbol) -> Result<usize> {
        let target = self
            .columns
            .get_mut(symbol)
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_string()))?;
        target.clear();
        let Some(derivation) = target.derivation() else {
            return Ok(0);
        };
        let expression = derivation.expression().clone();
        let leaves = derivation.units().clone();
        let sources: Vec<Symbol> = derivation.sources().iter().cloned().collect();
        let unit = target.unit().clone();

        let source_columns = sources
            .iter()
            .map(|source| {
                self.columns
                    .get(source)
                    .ok_or_else(|| Error::UnknownSymbol(source.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        let data = evaluate_rows(&expression, &leaves, &unit, source_columns)?;

        let target = self
            .columns
            .get_mut(symbol)
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_string()))?;
        for kind in data.errors.keys() {
            target.new_attachment(*kind, Some(kind.default_value()))?;
        }
        let rows = data.values.len();
        for (i, value) in data.values.into_iter().enumerate() {
            let attachments: Attachments = data
                .errors
                .iter()
                .map(|(kind, errors)| (*kind, errors[i]))
                .collect();
            target.raw_append(value, &attachments)?;
        }

        tracing::trace!("Computed {} rows for {}", rows, symbol);
        Ok(rows)
    }

    /// Update every derived column after all of its sources
    ///
    /// A dependency cycle fails with [`Error::CyclicReference`] before any
    /// column is touched. A failure while computing a column aborts the run;
    /// columns updated before it keep their fresh data.
    pub fn update_all(&mut self) -> Result<UpdateStats> {
        let mut graph = DependencyGraph::new();
        for symbol in &self.order {
            graph.add_node(symbol.clone());
            let Some(column) = self.columns.get(symbol) else {
                continue;
            };
            for source in column.sources() {
                if !self.columns.contains_key(source) {
                    return Err(Error::UnknownSymbol(source.to_string()));
                }
                graph.add_dependency(source.clone(), symbol.clone());
            }
        }

        let order = graph.calculation_order().map_err(|e| Error::CyclicReference {
            cycle: e.cycle.iter().map(|s| s.to_string()).collect(),
        })?;

        let mut stats = UpdateStats::default();
        for symbol in &order {
            stats.columns_visited += 1;
            let is_derived = self
                .columns
                .get(symbol)
                .map_or(false, |column| column.is_derived());
            if is_derived {
                stats.rows_computed += self.recompute(symbol)?;
                stats.columns_updated += 1;
            }
        }

        tracing::debug!(
            "Updated {} of {} columns ({} rows)",
            stats.columns_updated,
            stats.columns_visited,
            stats.rows_computed
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        let mut table = Table::new();
        let m = table.unit("m").unwrap();
        let s = table.unit("s").unwrap();
        table
            .add(Column::measurement_raw("x", m, (0..10).map(f64::from)))
            .unwrap();
        table
            .add(Column::measurement_raw("t", s, (1..11).map(f64::from)))
            .unwrap();
        table
    }

    #[test]
    fn test_lookup_by_symbol_and_name() {
        let table = table();
        let x = Symbol::new("x");
        assert!(table.contains(&x));
        assert!(table.contains("x"));
        assert!(!table.contains("y"));
        assert_eq!(table.column("t").unwrap().len(), 10);
        assert!(matches!(table.column("y"), Err(Error::UnknownColumn(_))));
        assert_eq!(table.symbols(), &[Symbol::new("x"), Symbol::new("t")]);
    }

    #[test]
    fn test_duplicate_symbol() {
        let mut table = table();
        let m = table.unit("m").unwrap();
        assert!(matches!(
            table.add(Column::measurement("x", m)),
            Err(Error::DuplicateSymbol(_))
        ));
    }

    #[test]
    fn test_derivate_velocity() {
        let mut table = table();
        table.derivate_formula("v", "km/h", "x/t").unwrap();
        table.update("v", false).unwrap();
        let v = table.column("v").unwrap();
        assert_eq!(v.len(), 10);
        // 9 m in 10 s is 3.24 km/h
        assert!((v.data()[9] - 3.24).abs() < 1e-9);
    }

    #[test]
    fn test_derivate_prefers_columns_over_units() {
        let mut table = table();
        let g = table.unit("g").unwrap();
        table.add(Column::measurement_raw("m", g, [1.0; 10])).unwrap();
        let column = table.derivate_formula("p", "g*s", "m*s").unwrap();
        let derivation = column.derivation().unwrap();
        assert_eq!(
            derivation.sources().iter().collect::<Vec<_>>(),
            vec![&Symbol::new("m")]
        );
        assert!(derivation.units().contains_key("s"));
        assert!(!derivation.units().contains_key("m"));
    }

    #[test]
    fn test_column_named_like_math_constant_is_rejected() {
        let mut table = table();
        let one = table.unit("").unwrap();
        table.add(Column::measurement_raw("e", one, [1.0; 10])).unwrap();
        assert!(matches!(
            table.derivate_formula("y", "m", "e*x"),
            Err(Error::InvalidFormula { .. })
        ));
    }

    #[test]
    fn test_derivate_without_columns_is_rejected() {
        let mut table = table();
        assert!(matches!(
            table.derivate_formula("c", "m/s", "3*m/s"),
            Err(Error::InvalidFormula { .. })
        ));
    }

    #[test]
    fn test_update_reports_cycle() {
        let mut table = table();
        let m = table.unit("m").unwrap();
        let mut sources = std::collections::BTreeSet::new();
        sources.insert(Symbol::new("b"));
        table
            .add(Column::derived("a", m.clone(), sources, praktool_formula::sym("b")))
            .unwrap();
        let mut sources = std::collections::BTreeSet::new();
        sources.insert(Symbol::new("a"));
        table
            .add(Column::derived("b", m, sources, praktool_formula::sym("a")))
            .unwrap();

        let err = table.update("a", true).unwrap_err();
        match err {
            Error::CyclicReference { cycle } => assert_eq!(cycle, vec!["a", "b", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
