//! JSON output

use std::collections::BTreeMap;
use std::io::Write;

use praktool_core::{Column, UncertaintyKind};
use serde::Serialize;

use super::TablePrinter;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct JsonTable<'a> {
    columns: Vec<JsonColumn<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonColumn<'a> {
    name: &'a str,
    unit: &'a str,
    kind: &'static str,
    values: Vec<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    errors: BTreeMap<&'static str, Vec<f64>>,
}

/// Prints columns as a JSON document
///
/// Unlike the text printers, errors are kept apart per uncertainty kind.
/// Non-finite values are written as `null`.
#[derive(Debug, Clone)]
pub struct JsonPrinter {
    columns: Vec<String>,
    kinds: Vec<UncertaintyKind>,
    pretty: bool,
}

impl JsonPrinter {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            kinds: UncertaintyKind::ALL.to_vec(),
            pretty: false,
        }
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = UncertaintyKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn json_column<'a>(&self, column: &'a Column) -> JsonColumn<'a> {
        let declared = column.attachment_kinds();
        let kinds: Vec<UncertaintyKind> = self
            .kinds
            .iter()
            .copied()
            .filter(|kind| declared.contains(kind))
            .collect();

        let mut values = Vec::with_capacity(column.len());
        let mut errors: BTreeMap<&'static str, Vec<f64>> = kinds
            .iter()
            .map(|kind| (kind.name(), Vec::with_capacity(column.len())))
            .collect();
        for (value, attachments) in column.iter_display() {
            values.push(value);
            for kind in &kinds {
                let error = attachments.get(kind).copied().unwrap_or(kind.default_value());
                errors.entry(kind.name()).or_default().push(error);
            }
        }

        JsonColumn {
            name: column.name(),
            unit: column.unit_name(),
            kind: column.kind().name(),
            values,
            errors,
        }
    }
}

impl TablePrinter for JsonPrinter {
    fn column_keys(&self) -> &[String] {
        &self.columns
    }

    fn print_columns(&self, columns: &[&Column], out: &mut dyn Write) -> Result<()> {
        let table = JsonTable {
            columns: columns.iter().map(|column| self.json_column(column)).collect(),
        };
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &table)?;
        } else {
            serde_json::to_writer(&mut *out, &table)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use praktool_core::Table;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_printer() {
        let mut table = Table::new();
        let v = table.unit("V").unwrap();
        table
            .add(Column::measurement_raw("U", v, [1.5, 2.0]))
            .unwrap()
            .new_attachment(UncertaintyKind::Systematic, Some(0.5))
            .unwrap();

        let text = JsonPrinter::new(["U"]).render(&table).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({
                "columns": [{
                    "name": "U",
                    "unit": "V",
                    "kind": "measurement",
                    "values": [1.5, 2.0],
                    "errors": {"systematic": [0.5, 0.5]}
                }]
            })
        );
    }
}
