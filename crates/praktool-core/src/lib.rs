//! # praktool-core
//!
//! Columns and tables for laboratory measurement data.
//!
//! A [`Table`] holds three kinds of [`Column`]s: measurements entered by the
//! user, constants, and derived columns defined by a formula over other
//! columns. Derived columns carry units and propagate statistical and
//! systematic uncertainties with Gaussian error propagation.
//!
//! ```
//! use praktool_core::{Column, Table};
//!
//! let mut table = Table::new();
//! let s = table.unit("s").unwrap();
//! table
//!     .add(Column::measurement_raw("t", s, [0.0, 1.0, 2.0]))
//!     .unwrap();
//! table.derivate_formula("t2", "ms", "2*t").unwrap();
//! table.update_all().unwrap();
//!
//! assert_eq!(table.column("t2").unwrap().data(), &[0.0, 2000.0, 4000.0]);
//! ```

pub mod column;
mod derivation;
pub mod error;
pub mod ops;
pub mod rounding;
pub mod stats;
pub mod table;
pub mod uncertainty;

pub use column::{Attachment, Column, ColumnKind, Derivation, Reading, Rows};
pub use error::{Error, Result};
pub use ops::{diff_nth, int_nth, JoinOptions, RegressionResult};
pub use rounding::{digit_rounding, error_rounding, round_significant};
pub use stats::{mean, quadrature_sum};
pub use table::{ColumnKey, Table, UpdateStats};
pub use uncertainty::{Attachments, UncertaintyKind};

pub use praktool_formula as formula;
