//! Table printers
//!
//! Every printer is configured with the keys of the columns it prints (all
//! columns when empty) and the uncertainty kinds it shows. Errors of several
//! kinds are merged by quadrature sum.

mod gnuplot;
mod json;
mod latex;
mod simple;

pub use gnuplot::GnuplotPrinter;
pub use json::JsonPrinter;
pub use latex::LatexPrinter;
pub use simple::SimplePrinter;

use std::io::Write;

use praktool_core::{quadrature_sum, Column, Error as CoreError, Table, UncertaintyKind};

use crate::error::{Error, Result};

/// Writes selected columns of a table in some output format
pub trait TablePrinter {
    /// Keys of the columns to print; empty prints every column
    fn column_keys(&self) -> &[String];

    /// Print already selected columns
    fn print_columns(&self, columns: &[&Column], out: &mut dyn Write) -> Result<()>;

    fn print(&self, table: &Table, out: &mut dyn Write) -> Result<()> {
        let columns = select_columns(table, self.column_keys())?;
        self.print_columns(&columns, out)
    }

    /// Print into a string
    fn render(&self, table: &Table) -> Result<String> {
        let mut buffer = Vec::new();
        self.print(table, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Look up columns by key, or take all columns in table order
pub fn select_columns<'a>(table: &'a Table, keys: &[String]) -> Result<Vec<&'a Column>> {
    if keys.is_empty() {
        return Ok(table.columns().collect());
    }
    keys.iter()
        .map(|key| table.column(key).map_err(Error::from))
        .collect()
}

/// A display value with its merged error, if the column shows one
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Field {
    pub value: f64,
    pub error: Option<f64>,
}

/// Row-major display fields of equally long columns
pub(crate) fn rows(columns: &[&Column], kinds: &[UncertaintyKind]) -> Result<Vec<Vec<Field>>> {
    let len = columns.first().map_or(0, |c| c.len());
    let mut rows = vec![Vec::with_capacity(columns.len()); len];

    for column in columns {
        if column.len() != len {
            return Err(CoreError::RowCountMismatch {
                column: column.name().to_string(),
                expected: len,
                found: column.len(),
            }
            .into());
        }

        let declared = column.attachment_kinds();
        let shows_error = kinds.iter().any(|kind| declared.contains(kind));
        for (row, (value, attachments)) in rows.iter_mut().zip(column.iter_display()) {
            let error = shows_error.then(|| {
                quadrature_sum(kinds.iter().filter_map(|kind| attachments.get(kind).copied()))
            });
            row.push(Field { value, error });
        }
    }
    Ok(rows)
}

/// Header cell in `symbol/unit` form
pub(crate) fn header(column: &Column) -> String {
    if column.unit().is_dimensionless() && column.unit_name() == "1" {
        column.name().to_string()
    } else {
        format!("{}/{}", column.name(), column.unit_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rows_merge_errors_in_quadrature() {
        let mut table = Table::new();
        let v = table.unit("V").unwrap();
        let column = table
            .add(Column::measurement_raw("U", v, [1.0, 2.0]))
            .unwrap();
        column
            .new_attachment(UncertaintyKind::Statistical, Some(0.3))
            .unwrap();
        column
            .new_attachment(UncertaintyKind::Systematic, Some(0.4))
            .unwrap();

        let columns = select_columns(&table, &[]).unwrap();
        let both = rows(&columns, &UncertaintyKind::ALL).unwrap();
        assert!((both[0][0].error.unwrap() - 0.5).abs() < 1e-12);

        let stat = rows(&columns, &[UncertaintyKind::Statistical]).unwrap();
        assert!((stat[1][0].error.unwrap() - 0.3).abs() < 1e-12);

        let none = rows(&columns, &[]).unwrap();
        assert_eq!(none[1][0], Field { value: 2.0, error: None });
    }

    #[test]
    fn test_select_unknown_column() {
        let table = Table::new();
        assert!(select_columns(&table, &["x".to_string()]).is_err());
    }
}
