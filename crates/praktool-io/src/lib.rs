//! # praktool-io
//!
//! Readers and writers for measurement data files.
//!
//! Two formats are supported: CSV with a `name/unit` header row, and the
//! annotated gnuplot format, where a `#%` comment line declares the columns:
//!
//! ```text
//! #% t/s x/m
//! 0 0.0
//! 1 4.9
//! ```

mod error;
mod options;
mod reader;
mod writer;

pub use error::{IoError, IoResult};
pub use options::{ColumnSpec, DataFormat, ReadOptions, WriteOptions};
pub use reader::TableReader;
pub use writer::TableWriter;
