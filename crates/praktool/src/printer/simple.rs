//! Fixed-width plain text output

use std::io::Write;

use praktool_core::{Column, UncertaintyKind};

use super::{header, rows, TablePrinter};
use crate::error::Result;

/// Prints right-aligned fixed-precision columns separated by spaces
#[derive(Debug, Clone)]
pub struct SimplePrinter {
    columns: Vec<String>,
    precision: usize,
    width: usize,
    kinds: Vec<UncertaintyKind>,
    header: bool,
}

impl SimplePrinter {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            precision: 6,
            width: 12,
            kinds: Vec::new(),
            header: false,
        }
    }

    /// Digits after the decimal point (default 6)
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Minimum field width (default 12)
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Follow each value with its error of the given kinds
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = UncertaintyKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Start with a line of `symbol/unit` headers
    pub fn header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    fn field(&self, value: f64) -> String {
        format!("{:>width$.precision$}", value, width = self.width, precision = self.precision)
    }
}

impl TablePrinter for SimplePrinter {
    fn column_keys(&self) -> &[String] {
        &self.columns
    }

    fn print_columns(&self, columns: &[&Column], out: &mut dyn Write) -> Result<()> {
        let rows = rows(columns, &self.kinds)?;

        if self.header {
            let cells: Vec<String> = columns
                .iter()
                .map(|column| format!("{:>width$}", header(column), width = self.width))
                .collect();
            writeln!(out, "{}", cells.join(" "))?;
        }

        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for field in row {
                cells.push(self.field(field.value));
                if let Some(error) = field.error {
                    cells.push(self.field(error));
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
    fn test_simple_printer() {
        let mut table = Table::new();
        let m = table.unit("m").unwrap();
        table.add(Column::measurement_raw("x", m, [1.0, 2.5])).unwrap();

        let text = SimplePrinter::new(["x"]).precision(2).width(6).render(&table).unwrap();
        assert_eq!(text, "  1.00\n  2.50\n");
    }

    #[test]
    fn test_simple_printer_header_and_errors() {
        let mut table = Table::new();
        let m = table.unit("m").unwrap();
        table
            .add(Column::measurement_raw("x", m, [1.0]))
            .unwrap()
            .new_attachment(UncertaintyKind::Statistical, Some(0.25))
            .unwrap();

        let text = SimplePrinter::new(Vec::<String>::new())
            .precision(2)
            .width(5)
            .header(true)
            .kinds([UncertaintyKind::Statistical])
            .render(&table)
            .unwrap();
        assert_eq!(text, "  x/m\n 1.00  0.25\n");
    }
}
