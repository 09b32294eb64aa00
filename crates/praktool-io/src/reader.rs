//! Data file reader

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use lazy_regex::regex;
use praktool_core::{Attachments, Column, Table};
use praktool_formula::Symbol;

use crate::error::{IoError, IoResult};
use crate::options::{ColumnSpec, DataFormat, ReadOptions};

/// Data file reader
pub struct TableReader;

impl TableReader {
    /// Read a data file into a new table, choosing the format by extension
    ///
    /// Files without a known extension are read as gnuplot data.
    pub fn read_file<P: AsRef<Path>>(path: P, options: &ReadOptions) -> IoResult<Table> {
        let mut table = Table::new();
        Self::read_file_into(path, options, &mut table)?;
        Ok(table)
    }

    /// Read a data file into an existing table
    ///
    /// Returns the symbols of the new columns.
    pub fn read_file_into<P: AsRef<Path>>(
        path: P,
        options: &ReadOptions,
        table: &mut Table,
    ) -> IoResult<Vec<Symbol>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        match DataFormat::from_path(path).unwrap_or(DataFormat::Gnuplot) {
            DataFormat::Csv => Self::read_csv_into(file, options, table),
            DataFormat::Gnuplot => Self::read_gnuplot_into(BufReader::new(file), options, table),
        }
    }

    /// Read annotated gnuplot data into a new table
    pub fn read_gnuplot<R: Read>(reader: R, options: &ReadOptions) -> IoResult<Table> {
        let mut table = Table::new();
        Self::read_gnuplot_into(BufReader::new(reader), options, &mut table)?;
        Ok(table)
    }

    /// Read annotated gnuplot data into `table`
    pub fn read_gnuplot_into<R: BufRead>(
        reader: R,
        options: &ReadOptions,
        table: &mut Table,
    ) -> IoResult<Vec<Symbol>> {
        let mut columns = if options.columns.is_empty() {
            None
        } else {
            Some(Self::make_columns(&options.columns, table)?)
        };

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(comment) = line.strip_prefix(options.comment) {
                if let Some(header) = comment.strip_prefix(options.annotation) {
                    if columns.is_some() {
                        log::warn!("line {}: column annotation ignored, columns already declared", line_no);
                    } else {
                        let specs = Self::parse_header(header, options.header_separator);
                        columns = Some(Self::make_columns(&specs, table)?);
                    }
                }
                continue;
            }

            let Some(columns) = columns.as_mut() else {
                return Err(IoError::parse(line_no, 1, "data before column annotation"));
            };
            let fields: Vec<&str> = regex!(r"[\s,]+")
                .split(line)
                .filter(|field| !field.is_empty())
                .collect();
            Self::append_row(columns, &fields, line_no)?;
        }

        let columns = columns.unwrap_or_default();
        Self::register(columns, table)
    }

    /// Read CSV data into a new table
    pub fn read_csv<R: Read>(reader: R, options: &ReadOptions) -> IoResult<Table> {
        let mut table = Table::new();
        Self::read_csv_into(reader, options, &mut table)?;
        Ok(table)
    }

    /// Read CSV data with a `name/unit` header row into `table`
    pub fn read_csv_into<R: Read>(
        reader: R,
        options: &ReadOptions,
        table: &mut Table,
    ) -> IoResult<Vec<Symbol>> {
        let comment = u8::try_from(options.comment).ok();
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(comment)
            .from_reader(reader);

        let mut columns = if options.columns.is_empty() {
            let specs: Vec<ColumnSpec> = csv_reader
                .headers()?
                .iter()
                .map(ColumnSpec::parse)
                .collect();
            Self::make_columns(&specs, table)?
        } else {
            log::warn!("CSV header ignored, columns already declared");
            Self::make_columns(&options.columns, table)?
        };

        for result in csv_reader.records() {
            let record = result?;
            let line_no = record.position().map_or(0, |p| p.line() as usize);
            let fields: Vec<&str> = record.iter().collect();
            if fields.iter().all(|field| field.is_empty()) {
                continue;
            }
            Self::append_row(&mut columns, &fields, line_no)?;
        }

        Self::register(columns, table)
    }

    // === Helper methods ===

    fn parse_header(header: &str, separator: Option<char>) -> Vec<ColumnSpec> {
        let cells: Vec<&str> = match separator {
            Some(separator) => header.split(separator).collect(),
            None => header.split_whitespace().collect(),
        };
        cells
            .into_iter()
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .map(ColumnSpec::parse)
            .collect()
    }

    fn make_columns(specs: &[ColumnSpec], table: &Table) -> IoResult<Vec<Column>> {
        specs
            .iter()
            .map(|spec| -> IoResult<Column> {
                let unit = table.unit(&spec.unit)?;
                Ok(Column::measurement(spec.name.as_str(), unit))
            })
            .collect()
    }

    fn append_row(columns: &mut [Column], fields: &[&str], line_no: usize) -> IoResult<()> {
        if fields.len() != columns.len() {
            return Err(IoError::parse(
                line_no,
                fields.len(),
                format!("expected {} fields, found {}", columns.len(), fields.len()),
            ));
        }

        let values = fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                Self::parse_number(field)
                    .ok_or_else(|| IoError::parse(line_no, i + 1, format!("invalid number '{}'", field)))
            })
            .collect::<IoResult<Vec<f64>>>()?;

        let empty = Attachments::new();
        for (column, value) in columns.iter_mut().zip(values) {
            column.raw_append(value, &empty)?;
        }
        Ok(())
    }

    /// Parse a field as an integer, then as a float
    fn parse_number(field: &str) -> Option<f64> {
        field
            .parse::<i64>()
            .map(|n| n as f64)
            .ok()
            .or_else(|| field.parse::<f64>().ok())
    }

    fn register(columns: Vec<Column>, table: &mut Table) -> IoResult<Vec<Symbol>> {
        let mut symbols = Vec::with_capacity(columns.len());
        for column in columns {
            log::debug!("read column {} [{}] with {} rows", column.name(), column.unit_name(), column.len());
            symbols.push(table.add(column)?.symbol().clone());
        }
        Ok(symbols)
    }
}
