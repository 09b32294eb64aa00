//! Column storage
//!
//! Values are stored unitless, as multiples of the column unit. Each declared
//! uncertainty kind keeps one error value per row, so every attachment has
//! the same length as the data.

use std::collections::{BTreeMap, BTreeSet};

use praktool_formula::{Expr, Quantity, Symbol, Unit};

use crate::error::{Error, Result};
use crate::stats;
use crate::uncertainty::{Attachments, UncertaintyKind};

/// One row to append to a measurement column
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// A single value with units
    Single(Quantity),
    /// Repeated readings of the same quantity, reduced to mean and
    /// standard error of the mean
    Repeated(Vec<Quantity>),
}

impl From<Quantity> for Reading {
    fn from(quantity: Quantity) -> Self {
        Reading::Single(quantity)
    }
}

impl From<Vec<Quantity>> for Reading {
    fn from(quantities: Vec<Quantity>) -> Self {
        Reading::Repeated(quantities)
    }
}

/// Error values of one uncertainty kind
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    default: Option<f64>,
    data: Vec<f64>,
}

impl Attachment {
    pub fn default_value(&self) -> Option<f64> {
        self.default
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// Formula of a derived column
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    sources: BTreeSet<Symbol>,
    expression: Expr,
    units: BTreeMap<String, Quantity>,
}

impl Derivation {
    pub fn sources(&self) -> &BTreeSet<Symbol> {
        &self.sources
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    /// Names in the formula that resolved to registry units or constants
    pub fn units(&self) -> &BTreeMap<String, Quantity> {
        &self.units
    }
}

/// One value repeated over a fixed number of rows
#[derive(Debug, Clone, PartialEq)]
pub struct ConstValue {
    value: f64,
    attachments: Attachments,
    length: usize,
}

/// Column variants
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// Values given by the user or read from a file
    Measurement,
    /// Values computed from other columns
    Derived(Derivation),
    /// A constant presented as a column of fixed length
    Const(ConstValue),
}

impl ColumnKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Measurement => "measurement",
            ColumnKind::Derived(_) => "derived",
            ColumnKind::Const(_) => "const",
        }
    }
}

/// A named, unit-tagged sequence of values with optional uncertainties
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    symbol: Symbol,
    unit: Unit,
    magnitude: f64,
    data: Vec<f64>,
    attachments: BTreeMap<UncertaintyKind, Attachment>,
    kind: ColumnKind,
}

impl Column {
    fn with_kind(symbol: impl Into<Symbol>, unit: Unit, kind: ColumnKind) -> Self {
        Self {
            symbol: symbol.into(),
            unit,
            magnitude: 1.0,
            data: Vec::new(),
            attachments: BTreeMap::new(),
            kind,
        }
    }

    /// Create an empty measurement column
    pub fn measurement(symbol: impl Into<Symbol>, unit: Unit) -> Self {
        Self::with_kind(symbol, unit, ColumnKind::Measurement)
    }

    /// Create a measurement column from readings with units
    pub fn measurement_from<R>(
        symbol: impl Into<Symbol>,
        unit: Unit,
        readings: impl IntoIterator<Item = R>,
    ) -> Result<Self>
    where
        R: Into<Reading>,
    {
        let mut column = Self::measurement(symbol, unit);
        for reading in readings {
            column.append(reading.into())?;
        }
        Ok(column)
    }

    /// Create a measurement column from values already in units of `unit`
    pub fn measurement_raw(
        symbol: impl Into<Symbol>,
        unit: Unit,
        values: impl IntoIterator<Item = f64>,
    ) -> Self {
        let mut column = Self::measurement(symbol, unit);
        column.data.extend(values);
        column
    }

    /// Create an empty derived column
    ///
    /// The formula is not checked here; [`Table::derivate`](crate::Table::derivate)
    /// validates symbols and units before registering a derived column.
    pub fn derived(
        symbol: impl Into<Symbol>,
        unit: Unit,
        sources: BTreeSet<Symbol>,
        expression: Expr,
    ) -> Self {
        Self::with_kind(
            symbol,
            unit,
            ColumnKind::Derived(Derivation {
                sources,
                expression,
                units: BTreeMap::new(),
            }),
        )
    }

    /// Attach the unit leaves a derived formula refers to
    pub(crate) fn with_unit_leaves(mut self, units: BTreeMap<String, Quantity>) -> Self {
        if let ColumnKind::Derived(derivation) = &mut self.kind {
            derivation.units = units;
        }
        self
    }

    /// Create a constant column of `length` rows
    ///
    /// `value` and `errors` carry units and are converted to `unit`.
    pub fn constant(
        symbol: impl Into<Symbol>,
        unit: Unit,
        value: Quantity,
        errors: &BTreeMap<UncertaintyKind, Quantity>,
        length: usize,
    ) -> Result<Self> {
        let symbol = symbol.into();
        let convert = |q: &Quantity| {
            q.in_unit(&unit).map_err(|_| Error::IncompatibleUnit {
                column: symbol.to_string(),
                expected: unit.dimension().to_string(),
                found: q.dimension().to_string(),
            })
        };
        let value = convert(&value)?;
        let attachments = errors
            .iter()
            .map(|(kind, q)| convert(q).map(|value| (*kind, value)))
            .collect::<Result<Attachments>>()?;

        Ok(Self::with_kind(
            symbol,
            unit,
            ColumnKind::Const(ConstValue {
                value,
                attachments,
                length,
            }),
        ))
    }

    /// Set the display scale factor
    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    // === Accessors ===

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        self.symbol.name()
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Display name of the unit
    pub fn unit_name(&self) -> &str {
        self.unit.name()
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.kind, ColumnKind::Derived(_))
    }

    pub fn derivation(&self) -> Option<&Derivation> {
        match &self.kind {
            ColumnKind::Derived(derivation) => Some(derivation),
            _ => None,
        }
    }

    /// Direct sources of a derived column; empty for other kinds
    pub fn sources(&self) -> impl Iterator<Item = &Symbol> {
        self.derivation()
            .into_iter()
            .flat_map(|derivation| derivation.sources.iter())
    }

    /// Number of rows (the virtual length for constant columns)
    pub fn len(&self) -> usize {
        match &self.kind {
            ColumnKind::Const(constant) => constant.length,
            _ => self.data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored unitless values; empty for constant columns
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// All row values, including the repeated value of a constant column
    pub fn values(&self) -> Vec<f64> {
        match &self.kind {
            ColumnKind::Const(constant) => vec![constant.value; constant.length],
            _ => self.data.clone(),
        }
    }

    /// Declared uncertainty kinds
    pub fn attachment_kinds(&self) -> Vec<UncertaintyKind> {
        match &self.kind {
            ColumnKind::Const(constant) => constant.attachments.keys().copied().collect(),
            _ => self.attachments.keys().copied().collect(),
        }
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachment_kinds().is_empty()
    }

    pub fn attachment(&self, kind: UncertaintyKind) -> Option<&Attachment> {
        self.attachments.get(&kind)
    }

    // === Mutation ===

    fn ensure_mutable(&self) -> Result<()> {
        if let ColumnKind::Const(_) = self.kind {
            return Err(Error::InvalidArgument(format!(
                "column {} is constant",
                self.symbol
            )));
        }
        Ok(())
    }

    /// Declare an uncertainty attachment
    ///
    /// `default` fills the existing rows and any later row that does not
    /// specify a value. A non-empty column needs a default.
    pub fn new_attachment(&mut self, kind: UncertaintyKind, default: Option<f64>) -> Result<()> {
        self.ensure_mutable()?;
        if self.attachments.contains_key(&kind) {
            return Err(Error::AttachmentExists {
                column: self.symbol.to_string(),
                kind,
            });
        }
        let data = match default {
            Some(value) => vec![value; self.data.len()],
            None if self.data.is_empty() => Vec::new(),
            None => {
                return Err(Error::MissingAttachmentDefault {
                    column: self.symbol.to_string(),
                    kind,
                })
            }
        };
        self.attachments.insert(kind, Attachment { default, data });
        Ok(())
    }

    /// Add an error proportional to each value, e.g. a 2% calibration error
    ///
    /// An undeclared attachment is declared with default 0. Unless `additive`
    /// is set, existing error values are reset to zero first.
    pub fn attach_relative(
        &mut self,
        kind: UncertaintyKind,
        factor: f64,
        additive: bool,
    ) -> Result<()> {
        self.ensure_mutable()?;
        if !self.attachments.contains_key(&kind) {
            self.new_attachment(kind, Some(kind.default_value()))?;
        }
        let len = self.data.len();
        if let Some(attachment) = self.attachments.get_mut(&kind) {
            if !additive {
                attachment.data = vec![0.0; len];
            }
            for (error, value) in attachment.data.iter_mut().zip(&self.data) {
                *error += (value * factor).abs();
            }
        }
        Ok(())
    }

    /// Delete all rows and attachments
    pub fn clear(&mut self) {
        self.data.clear();
        self.attachments.clear();
    }

    /// Append one unitless value
    ///
    /// Every declared kind takes its value from `attachments`, else the
    /// attachment default. Kinds that are not declared are ignored.
    pub fn raw_append(&mut self, value: f64, attachments: &Attachments) -> Result<()> {
        self.ensure_mutable()?;

        let mut row = Vec::with_capacity(self.attachments.len());
        for (kind, attachment) in &self.attachments {
            let error = attachments
                .get(kind)
                .copied()
                .or(attachment.default)
                .ok_or_else(|| Error::MissingAttachmentValue {
                    column: self.symbol.to_string(),
                    kind: *kind,
                })?;
            row.push(error);
        }

        for (attachment, error) in self.attachments.values_mut().zip(row) {
            attachment.data.push(error);
        }
        self.data.push(value);
        Ok(())
    }

    fn to_unitless(&self, quantity: &Quantity) -> Result<f64> {
        quantity
            .in_unit(&self.unit)
            .map_err(|_| Error::IncompatibleUnit {
                column: self.symbol.to_string(),
                expected: self.unit.dimension().to_string(),
                found: quantity.dimension().to_string(),
            })
    }

    /// Append a reading to a measurement column
    ///
    /// Repeated readings store their mean and put the standard error of the
    /// mean into the statistical attachment, declaring it if necessary.
    pub fn append(&mut self, reading: Reading) -> Result<()> {
        if !matches!(self.kind, ColumnKind::Measurement) {
            return Err(Error::NotMeasurement(self.symbol.to_string()));
        }

        match reading {
            Reading::Single(quantity) => {
                let value = self.to_unitless(&quantity)?;
                self.raw_append(value, &Attachments::new())
            }
            Reading::Repeated(quantities) => {
                let values = quantities
                    .iter()
                    .map(|q| self.to_unitless(q))
                    .collect::<Result<Vec<_>>>()?;
                let (mean, sem) = stats::mean(&values)?;
                if !self.attachments.contains_key(&UncertaintyKind::Statistical) {
                    self.new_attachment(UncertaintyKind::Statistical, Some(0.0))?;
                }
                let mut row = Attachments::new();
                row.insert(UncertaintyKind::Statistical, sem);
                self.raw_append(mean, &row)
            }
        }
    }

    // === Reading ===

    /// Rows as `(value, attachments)` pairs
    pub fn iter(&self) -> Rows<'_> {
        Rows {
            column: self,
            index: 0,
        }
    }

    /// Rows scaled for display by `1 / magnitude`, in units of [`Column::unit_name`]
    pub fn iter_display(&self) -> impl Iterator<Item = (f64, Attachments)> + '_ {
        let scale = 1.0 / self.magnitude;
        self.iter().map(move |(value, attachments)| {
            let attachments = attachments
                .into_iter()
                .map(|(kind, error)| (kind, error * scale))
                .collect();
            (value * scale, attachments)
        })
    }

    /// Mean and standard error of the mean, with the unit attached
    pub fn mean(&self) -> Result<(Quantity, Quantity)> {
        let (mean, sem) = stats::mean(&self.values())?;
        let unit = self.unit.quantity();
        Ok((unit * mean, unit * sem))
    }
}

impl<'a> IntoIterator for &'a Column {
    type Item = (f64, Attachments);
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Rows<'a> {
        self.iter()
    }
}

/// Iterator over the rows of a [`Column`]
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    column: &'a Column,
    index: usize,
}

impl Iterator for Rows<'_> {
    type Item = (f64, Attachments);

    fn next(&mut self) -> Option<Self::Item> {
        let column = self.column;
        if self.index >= column.len() {
            return None;
        }
        let i = self.index;
        self.index += 1;

        match &column.kind {
            ColumnKind::Const(constant) => Some((constant.value, constant.attachments.clone())),
            _ => {
                let attachments = column
                    .attachments
                    .iter()
                    .map(|(kind, attachment)| (*kind, attachment.data[i]))
                    .collect();
                Some((column.data[i], attachments))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.column.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rows<'_> {}
