//! Data file writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use praktool_core::{quadrature_sum, Column, Error as CoreError, Table};

use crate::error::IoResult;
use crate::options::{ColumnSpec, DataFormat, WriteOptions};

/// One output column: header cell and values
struct OutputColumn {
    spec: ColumnSpec,
    values: Vec<f64>,
}

/// Data file writer
pub struct TableWriter;

impl TableWriter {
    /// Write a table to a file, choosing the format by extension
    ///
    /// Files without a known extension are written as gnuplot data.
    pub fn write_file<P: AsRef<Path>>(
        table: &Table,
        path: P,
        options: &WriteOptions,
    ) -> IoResult<()> {
        let path = path.as_ref();
        let format = DataFormat::from_path(path).unwrap_or(DataFormat::Gnuplot);
        let file = BufWriter::new(File::create(path)?);
        match format {
            DataFormat::Csv => Self::write_csv(table, file, options),
            DataFormat::Gnuplot => Self::write_gnuplot(table, file, options),
        }
    }

    /// Write annotated gnuplot data
    pub fn write_gnuplot<W: Write>(table: &Table, mut writer: W, options: &WriteOptions) -> IoResult<()> {
        let columns = Self::collect(table, options)?;

        let header: Vec<String> = columns.iter().map(|c| c.spec.to_string()).collect();
        writeln!(writer, "#{} {}", options.annotation, header.join(" "))?;

        for row in 0..Self::row_count(&columns) {
            let fields: Vec<String> = columns.iter().map(|c| c.values[row].to_string()).collect();
            writeln!(writer, "{}", fields.join(" "))?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write CSV with a `name/unit` header row
    pub fn write_csv<W: Write>(table: &Table, writer: W, options: &WriteOptions) -> IoResult<()> {
        let columns = Self::collect(table, options)?;

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        csv_writer.write_record(columns.iter().map(|c| c.spec.to_string()))?;
        for row in 0..Self::row_count(&columns) {
            csv_writer.write_record(columns.iter().map(|c| c.values[row].to_string()))?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    // === Helper methods ===

    fn row_count(columns: &[OutputColumn]) -> usize {
        columns.first().map_or(0, |c| c.values.len())
    }

    fn collect(table: &Table, options: &WriteOptions) -> IoResult<Vec<OutputColumn>> {
        let selected: Vec<&Column> = if options.columns.is_empty() {
            table.columns().collect()
        } else {
            options
                .columns
                .iter()
                .map(|name| table.column(name))
                .collect::<Result<_, _>>()?
        };

        let len = selected.first().map_or(0, |c| c.len());
        let mut columns = Vec::with_capacity(selected.len());
        for column in selected {
            if column.len() != len {
                return Err(CoreError::RowCountMismatch {
                    column: column.name().to_string(),
                    expected: len,
                    found: column.len(),
                }
                .into());
            }

            let unit = column.unit_name().to_string();
            let (values, errors): (Vec<f64>, Vec<f64>) = column
                .iter()
                .map(|(value, attachments)| (value, quadrature_sum(attachments.into_values())))
                .unzip();

            columns.push(OutputColumn {
                spec: ColumnSpec::new(column.name(), unit.clone()),
                values,
            });
            if options.errors && column.has_attachments() {
                columns.push(OutputColumn {
                    spec: ColumnSpec::new(format!("d{}", column.name()), unit),
                    values: errors,
                });
            }
        }
        Ok(columns)
    }
}
