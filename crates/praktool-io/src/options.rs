//! Reader and writer options

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A column declaration: display name and unit text
///
/// Written as `name/unit` in file headers; the first `/` separates the two,
/// so `a/m/s^2` declares column `a` in `m/s^2`. A missing unit means a
/// dimensionless column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub unit: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
        }
    }

    /// Split a `name/unit` header cell
    pub fn parse(cell: &str) -> Self {
        match cell.split_once('/') {
            Some((name, unit)) => Self::new(name.trim(), unit.trim()),
            None => Self::new(cell.trim(), ""),
        }
    }
}

impl FromStr for ColumnSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}/{}", self.name, self.unit)
        }
    }
}

/// Options for reading data files
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// CSV field delimiter (default: comma)
    pub delimiter: u8,
    /// Comment character (default: `#`)
    pub comment: char,
    /// Marks a comment line as a column annotation (default: `%`)
    pub annotation: char,
    /// Separator between annotated columns; `None` splits on whitespace
    pub header_separator: Option<char>,
    /// Columns declared up front; an in-file header is then ignored
    pub columns: Vec<ColumnSpec>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            comment: '#',
            annotation: '%',
            header_separator: None,
            columns: Vec::new(),
        }
    }
}

impl ReadOptions {
    /// Declare the columns instead of reading them from the file
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = ColumnSpec>) -> Self {
        self.columns = columns.into_iter().collect();
        self
    }
}

/// Options for writing data files
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// CSV field delimiter (default: comma)
    pub delimiter: u8,
    /// Annotation marker written after `#` in gnuplot headers (default: `%`)
    pub annotation: char,
    /// Columns to write, by name; empty writes every column
    pub columns: Vec<String>,
    /// Follow every column that has attachments with a column of its total error
    pub errors: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            annotation: '%',
            columns: Vec::new(),
            errors: false,
        }
    }
}

/// Supported data file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Comma separated values with a `name/unit` header row
    Csv,
    /// Whitespace separated values with a `#%` annotation line
    Gnuplot,
}

impl DataFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<DataFormat> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(DataFormat::Csv),
            "dat" | "txt" | "gp" | "gnuplot" | "data" => Some(DataFormat::Gnuplot),
            _ => None,
        }
    }
}

impl FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(DataFormat::Csv),
            "gnuplot" | "dat" => Ok(DataFormat::Gnuplot),
            other => Err(format!("unknown data format '{}'", other)),
        }
    }
}
