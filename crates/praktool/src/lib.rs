//! # praktool
//!
//! Measurement tables for physics lab reports.
//!
//! Read columns from data files, define derived quantities with formulas,
//! and let units and uncertainties follow along. Statistical and systematic
//! errors are propagated separately with Gaussian error propagation.
//!
//! ## Example
//!
//! ```rust
//! use praktool::prelude::*;
//!
//! let data = "#% t/s s/m\n0 0\n1 4.9\n2 19.6\n";
//! let mut table = TableReader::read_gnuplot(data.as_bytes(), &ReadOptions::default()).unwrap();
//!
//! table.define("g[m/s^2] = 2*s/t^2").unwrap();
//! table.update("g", false).unwrap();
//!
//! let printer = SimplePrinter::new(["t", "g"]);
//! let text = printer.render(&table).unwrap();
//! assert_eq!(text.lines().count(), 3);
//! ```

pub mod definition;
pub mod error;
pub mod prelude;
pub mod printer;

pub use definition::Definition;
pub use error::{Error, Result};
pub use printer::{GnuplotPrinter, JsonPrinter, LatexPrinter, SimplePrinter, TablePrinter};

// Re-export core types
pub use praktool_core::{
    digit_rounding, error_rounding, mean, quadrature_sum, round_significant, Attachment,
    Attachments, Column, ColumnKey, ColumnKind, JoinOptions, Reading, RegressionResult, Table,
    UncertaintyKind, UpdateStats,
};

// Re-export formula types
pub use praktool_formula::{
    parse_expression, propagate_eval, sym, Dimension, Expr, FormulaError, PropagationInput,
    Quantity, Symbol, Unit, UnitRegistry,
};

// Re-export I/O types
pub use praktool_io::{
    ColumnSpec, DataFormat, IoError, ReadOptions, TableReader, TableWriter, WriteOptions,
};

use std::path::Path;

/// Extension trait for Table to add file I/O and text definitions
pub trait TableExt: Sized {
    /// Open a data file, choosing the format by extension
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;

    /// Open a data file with explicit read options and unit registry
    fn open_with<P: AsRef<Path>>(
        path: P,
        options: &ReadOptions,
        registry: std::sync::Arc<UnitRegistry>,
    ) -> Result<Self>;

    /// Save all columns to a data file, choosing the format by extension
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Register a derived column from a `name[unit] = formula` definition
    fn define(&mut self, definition: &str) -> Result<Symbol>;
}

impl TableExt for Table {
    fn open<P: AsRef<Path>>(path: P) -> Result<Table> {
        Ok(TableReader::read_file(path, &ReadOptions::default())?)
    }

    fn open_with<P: AsRef<Path>>(
        path: P,
        options: &ReadOptions,
        registry: std::sync::Arc<UnitRegistry>,
    ) -> Result<Table> {
        let mut table = Table::with_registry(registry);
        TableReader::read_file_into(path, options, &mut table)?;
        Ok(table)
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(TableWriter::write_file(self, path, &WriteOptions::default())?)
    }

    fn define(&mut self, definition: &str) -> Result<Symbol> {
        let definition = Definition::parse(definition)?;
        tracing::debug!("Defining {}", definition);
        let column = self.derivate_formula(&definition.name, &definition.unit, &definition.formula)?;
        Ok(column.symbol().clone())
    }
}
