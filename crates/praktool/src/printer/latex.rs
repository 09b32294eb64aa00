//! LaTeX `tabular` output

use std::io::Write;

use praktool_core::{error_rounding, Column, UncertaintyKind};

use super::{header, rows, Field, TablePrinter};
use crate::error::Result;

/// Prints a booktabs `tabular` with `symbol/unit` headers
///
/// Values with an error are typeset as `$value \pm error$`, rounded so that
/// both show the same decimal position.
#[derive(Debug, Clone)]
pub struct LatexPrinter {
    columns: Vec<String>,
    alignment: Option<String>,
    precision: usize,
    digits: Option<usize>,
    kinds: Vec<UncertaintyKind>,
}

impl LatexPrinter {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            alignment: None,
            precision: 6,
            digits: None,
            kinds: UncertaintyKind::ALL.to_vec(),
        }
    }

    /// Column specification such as `lrr`; defaults to one `r` per column
    pub fn alignment(mut self, alignment: impl Into<String>) -> Self {
        self.alignment = Some(alignment.into());
        self
    }

    /// Digits after the decimal point for values without error
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Force the number of significant digits of values with error
    pub fn digits(mut self, digits: Option<usize>) -> Self {
        self.digits = digits;
        self
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = UncertaintyKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    fn format_field(&self, field: &Field) -> String {
        match field.error {
            Some(error) => {
                let (value, error) = error_rounding(field.value, error, self.digits);
                format!("${} \\pm {}$", value, error)
            }
            None => format!("{:.*}", self.precision, field.value),
        }
    }
}

impl TablePrinter for LatexPrinter {
    fn column_keys(&self) -> &[String] {
        &self.columns
    }

    fn print_columns(&self, columns: &[&Column], out: &mut dyn Write) -> Result<()> {
        let rows = rows(columns, &self.kinds)?;
        let alignment = self
            .alignment
            .clone()
            .unwrap_or_else(|| "r".repeat(columns.len()));

        writeln!(out, "\\begin{{tabular}}{{{}}}", alignment)?;
        writeln!(out, "\\toprule")?;
        let headers: Vec<String> = columns.iter().map(|column| header(column)).collect();
        writeln!(out, "{}\\\\", headers.join(" & "))?;
        writeln!(out, "\\midrule")?;
        for row in &rows {
            let cells: Vec<String> = row.iter().map(|field| self.format_field(field)).collect();
            writeln!(out, "{}\\\\", cells.join(" & "))?;
        }
        writeln!(out, "\\bottomrule")?;
        writeln!(out, "\\end{{tabular}}")?;
        Ok(())
    }
}
