//! Gnuplot data output

use std::io::Write;

use praktool_core::{Column, UncertaintyKind};

use super::{header, rows, TablePrinter};
use crate::error::Result;

/// Prints values and errors as space separated gnuplot data
///
/// A `#` comment line names the columns, so the output can be plotted with
/// `using 1:2:3`-style column numbers.
#[derive(Debug, Clone)]
pub struct GnuplotPrinter {
    columns: Vec<String>,
    precision: usize,
    kinds: Vec<UncertaintyKind>,
}

impl GnuplotPrinter {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            precision: 6,
            kinds: UncertaintyKind::ALL.to_vec(),
        }
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = UncertaintyKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }
}

impl TablePrinter for GnuplotPrinter {
    fn column_keys(&self) -> &[String] {
        &self.columns
    }

    fn print_columns(&self, columns: &[&Column], out: &mut dyn Write) -> Result<()> {
        let rows = rows(columns, &self.kinds)?;

        let mut names = Vec::with_capacity(columns.len());
        if let Some(first) = rows.first() {
            for (column, field) in columns.iter().zip(first) {
                names.push(header(column));
                if field.error.is_some() {
                    names.push(format!("d{}", column.name()));
                }
            }
        }
        writeln!(out, "# {}", names.join(" "))?;

        for row in rows {
            let mut cells = Vec::with_capacity(row.len() * 2);
            for field in row {
                cells.push(format!("{:.*}", self.precision, field.value));
                if let Some(error) = field.error {
                    cells.push(format!("{:.*}", self.precision, error));
                }
            }
            writeln!(out, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use praktool_core::Table;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_gnuplot_printer_error_columns() {
        let mut table = Table::new();
        let s = table.unit("s").unwrap();
        let m = table.unit("m").unwrap();
        table.add(Column::measurement_raw("t", s, [0.0, 1.0])).unwrap();
        table
            .add(Column::measurement_raw("x", m, [0.5, 1.5]))
            .unwrap()
            .new_attachment(UncertaintyKind::Systematic, Some(0.1))
            .unwrap();

        let text = GnuplotPrinter::new(["t", "x"]).precision(2).render(&table).unwrap();
        assert_eq!(text, "# t/s x/m dx\n0.00 0.50 0.10\n1.00 1.50 0.10\n");
    }
}
