//! Prelude module - common imports for praktool users
//!
//! ```rust
//! use praktool::prelude::*;
//! ```

pub use crate::{
    // Main types
    Column,
    ColumnKind,
    Reading,
    Table,
    // Extension traits
    TableExt,
    // Units and formulas
    Quantity,
    Symbol,
    Unit,
    UnitRegistry,
    // Uncertainties
    Attachments,
    UncertaintyKind,
    // Column operations
    JoinOptions,
    UpdateStats,
    // Printers
    GnuplotPrinter,
    JsonPrinter,
    LatexPrinter,
    SimplePrinter,
    TablePrinter,
    // I/O types
    ReadOptions,
    TableReader,
    TableWriter,
    WriteOptions,
    // Error types
    Error,
    Result,
};
