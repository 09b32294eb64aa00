//! Row-wise evaluation of derived columns

use std::collections::{BTreeMap, BTreeSet};

use praktool_formula::{build_error_expression, CompiledFormula, Expr, Quantity, Symbol, Unit};

use crate::column::{Column, Rows};
use crate::error::{Error, Result};
use crate::uncertainty::UncertaintyKind;

/// Source columns walked in lock-step
///
/// Each source gets one placeholder symbol that stands for its error in the
/// propagation formula. Rows come out in SI magnitudes.
pub(crate) struct AlignedSources<'a> {
    columns: Vec<&'a Column>,
    len: usize,
    error_symbols: Vec<(Symbol, Symbol)>,
    kinds: BTreeSet<UncertaintyKind>,
}

/// One aligned row, scaled to SI
pub(crate) struct AlignedRow {
    /// Source values
    pub values: Vec<f64>,
    /// Source errors per kind; sources without that kind contribute zero
    pub errors: BTreeMap<UncertaintyKind, Vec<f64>>,
}

impl<'a> AlignedSources<'a> {
    pub fn new(columns: Vec<&'a Column>) -> Result<Self> {
        let len = columns.first().map_or(0, |column| column.len());
        if let Some(column) = columns.iter().find(|column| column.len() != len) {
            return Err(Error::RowCountMismatch {
                column: column.name().to_string(),
                expected: len,
                found: column.len(),
            });
        }

        let error_symbols = columns
            .iter()
            .map(|column| {
                let symbol = column.symbol().clone();
                let error = Symbol::dummy(format!("δ{}", symbol));
                (symbol, error)
            })
            .collect();
        let kinds = columns
            .iter()
            .flat_map(|column| column.attachment_kinds())
            .collect();

        Ok(Self {
            columns,
            len,
            error_symbols,
            kinds,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Union of the uncertainty kinds declared on the sources
    pub fn kinds(&self) -> &BTreeSet<UncertaintyKind> {
        &self.kinds
    }

    /// `(source, error placeholder)` pairs
    pub fn error_symbols(&self) -> &[(Symbol, Symbol)] {
        &self.error_symbols
    }

    /// Expression variables of the sources, in row order
    pub fn source_names(&self) -> Vec<String> {
        self.error_symbols
            .iter()
            .map(|(source, _)| source.var_name())
            .collect()
    }

    /// Expression variables of the error placeholders, in row order
    pub fn placeholder_names(&self) -> Vec<String> {
        self.error_symbols
            .iter()
            .map(|(_, error)| error.var_name())
            .collect()
    }

    pub fn rows(&self) -> AlignedRows<'_> {
        AlignedRows {
            sources: self,
            iters: self.columns.iter().map(|column| column.iter()).collect(),
        }
    }
}

/// Iterator over [`AlignedRow`]s
pub(crate) struct AlignedRows<'a> {
    sources: &'a AlignedSources<'a>,
    iters: Vec<Rows<'a>>,
}

impl Iterator for AlignedRows<'_> {
    type Item = AlignedRow;

    fn next(&mut self) -> Option<AlignedRow> {
        let width = self.iters.len();
        let mut values = Vec::with_capacity(width);
        let mut errors: BTreeMap<UncertaintyKind, Vec<f64>> = self
            .sources
            .kinds
            .iter()
            .map(|kind| (*kind, Vec::with_capacity(width)))
            .collect();

        for (iter, column) in self.iters.iter_mut().zip(&self.sources.columns) {
            let (value, attachments) = iter.next()?;
            let scale = column.unit().scale();
            values.push(value * scale);
            for (kind, row) in errors.iter_mut() {
                row.push(attachments.get(kind).map_or(0.0, |error| error * scale));
            }
        }
        if values.is_empty() {
            return None;
        }

        Some(AlignedRow { values, errors })
    }
}

/// Freshly computed contents of a derived column
#[derive(Debug, Default)]
pub(crate) struct DerivedData {
    pub values: Vec<f64>,
    pub errors: BTreeMap<UncertaintyKind, Vec<f64>>,
}

/// Evaluate `expression` over the aligned `sources`, in units of `unit`
///
/// `unit_leaves` are the names in `expression` that stand for registry
/// units or constants; they are fed their SI magnitudes.
pub(crate) fn evaluate_rows(
    expression: &Expr,
    unit_leaves: &BTreeMap<String, Quantity>,
    unit: &Unit,
    sources: Vec<&Column>,
) -> Result<DerivedData> {
    let aligned = AlignedSources::new(sources)?;

    let mut params = aligned.source_names();
    params.extend(unit_leaves.keys().cloned());
    let leaf_values: Vec<f64> = unit_leaves.values().map(Quantity::value).collect();
    let value_formula = CompiledFormula::compile(expression, params.clone())?;

    let error_formula = if aligned.kinds().is_empty() {
        None
    } else {
        let error_expression = build_error_expression(expression, aligned.error_symbols())?;
        params.extend(aligned.placeholder_names());
        Some(CompiledFormula::compile(&error_expression, params)?)
    };

    let mut data = DerivedData {
        values: Vec::with_capacity(aligned.len()),
        errors: aligned
            .kinds()
            .iter()
            .map(|kind| (*kind, Vec::with_capacity(aligned.len())))
            .collect(),
    };

    let scale = unit.scale();
    for row in aligned.rows() {
        let mut args = row.values;
        args.extend_from_slice(&leaf_values);
        data.values.push(value_formula.evaluate(&args) / scale);

        if let Some(error_formula) = &error_formula {
            let base = args.len();
            for (kind, errors) in row.errors {
                args.truncate(base);
                args.extend(errors);
                let error = error_formula.evaluate(&args).abs() / scale;
                data.errors.entry(kind).or_default().push(error);
            }
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::uncertainty::Attachments;
    use praktool_formula::{parse_expression, UnitRegistry};

    #[test]
    fn test_rows_require_equal_lengths() {
        let registry = UnitRegistry::si();
        let m = registry.parse_unit("m").unwrap();
        let a = Column::measurement_raw("a", m.clone(), [1.0, 2.0]);
        let b = Column::measurement_raw("b", m, [1.0]);
        assert!(matches!(
            AlignedSources::new(vec![&a, &b]),
            Err(Error::RowCountMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_evaluate_rows_converts_units_and_errors() {
        let registry = UnitRegistry::si();
        let mut x = Column::measurement("x", registry.parse_unit("cm").unwrap());
        x.new_attachment(UncertaintyKind::Statistical, None).unwrap();
        let mut row = Attachments::new();
        row.insert(UncertaintyKind::Statistical, 2.0);
        x.raw_append(100.0, &row).unwrap();

        let m = registry.parse_unit("m").unwrap();
        let expression = parse_expression("3*x").unwrap();
        let data = evaluate_rows(&expression, &BTreeMap::new(), &m, vec![&x]).unwrap();
        assert!((data.values[0] - 3.0).abs() < 1e-12);
        let errors = &data.errors[&UncertaintyKind::Statistical];
        assert!((errors[0] - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_rows_feeds_unit_leaves() {
        let registry = UnitRegistry::si();
        let t = Column::measurement_raw("t", registry.parse_unit("min").unwrap(), [1.0, 2.0]);

        let mut leaves = BTreeMap::new();
        leaves.insert("s".to_string(), registry.get("s").unwrap());
        let expression = parse_expression("t/s").unwrap();
        let data =
            evaluate_rows(&expression, &leaves, &Unit::dimensionless(), vec![&t]).unwrap();
        assert_eq!(data.values, vec![60.0, 120.0]);
        assert!(data.errors.is_empty());
    }
}
