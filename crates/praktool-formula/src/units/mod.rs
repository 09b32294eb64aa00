//! Physical dimensions, quantities and units
//!
//! A [`Dimension`] is the vector of exponents over the seven SI base
//! dimensions. A [`Quantity`] pairs an SI magnitude with a dimension, and a
//! [`Unit`] is a display name together with the unit expression it was parsed
//! from and the quantity that expression resolves to.

mod codata;
mod registry;

pub use registry::{default_registry, UnitRegistry};

use std::fmt;
use std::ops::{Div, Mul};

use symb_anafis::visitor::ExprView;
use symb_anafis::Expr;

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::constant_value;
use crate::symbol::is_math_constant;

/// Tolerance used when comparing (possibly fractional) dimension exponents
const EXPONENT_EPSILON: f64 = 1e-9;

/// Symbols of the SI base dimensions, in storage order
const BASE_SYMBOLS: [&str; 7] = ["m", "kg", "s", "A", "K", "mol", "cd"];

/// Exponents over (length, mass, time, current, temperature, amount, luminosity)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension([f64; 7]);

impl Dimension {
    pub const DIMENSIONLESS: Dimension = Dimension([0.0; 7]);
    pub const LENGTH: Dimension = Dimension([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    pub const MASS: Dimension = Dimension([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    pub const TIME: Dimension = Dimension([0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    pub const CURRENT: Dimension = Dimension([0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    pub const TEMPERATURE: Dimension = Dimension([0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    pub const AMOUNT: Dimension = Dimension([0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    pub const LUMINOSITY: Dimension = Dimension([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

    /// Build a dimension from raw exponents
    pub fn new(exponents: [f64; 7]) -> Self {
        Dimension(exponents)
    }

    pub fn exponents(&self) -> &[f64; 7] {
        &self.0
    }

    pub fn is_dimensionless(&self) -> bool {
        self.is_compatible(&Dimension::DIMENSIONLESS)
    }

    /// Equality up to floating point noise in the exponents
    pub fn is_compatible(&self, other: &Dimension) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() < EXPONENT_EPSILON)
    }

    pub fn powf(self, exponent: f64) -> Dimension {
        Dimension(self.0.map(|e| e * exponent))
    }

    pub fn recip(self) -> Dimension {
        self.powf(-1.0)
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension::DIMENSIONLESS
    }
}

impl Mul for Dimension {
    type Output = Dimension;
    fn mul(self, rhs: Dimension) -> Dimension {
        let mut out = self.0;
        for (e, r) in out.iter_mut().zip(rhs.0) {
            *e += r;
        }
        Dimension(out)
    }
}

impl Div for Dimension {
    type Output = Dimension;
    fn div(self, rhs: Dimension) -> Dimension {
        self * rhs.recip()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (symbol, exponent) in BASE_SYMBOLS.iter().zip(self.0) {
            if exponent.abs() < EXPONENT_EPSILON {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            f.write_str(symbol)?;
            if (exponent - 1.0).abs() >= EXPONENT_EPSILON {
                if (exponent - exponent.round()).abs() < EXPONENT_EPSILON {
                    write!(f, "^{}", exponent.round() as i64)?;
                } else {
                    write!(f, "^{}", exponent)?;
                }
            }
        }
        if first {
            f.write_str("1")?;
        }
        Ok(())
    }
}

/// An SI magnitude with a physical dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    value: f64,
    dimension: Dimension,
}

impl Quantity {
    pub fn new(value: f64, dimension: Dimension) -> Self {
        Self { value, dimension }
    }

    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, Dimension::DIMENSIONLESS)
    }

    /// Magnitude in SI base units
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn powf(self, exponent: f64) -> Quantity {
        Quantity::new(self.value.powf(exponent), self.dimension.powf(exponent))
    }

    /// Sum of two quantities of the same dimension
    pub fn checked_add(self, other: Quantity) -> FormulaResult<Quantity> {
        if !self.dimension.is_compatible(&other.dimension) {
            return Err(FormulaError::IncompatibleDimensions {
                operation: "addition".into(),
                left: self.dimension,
                right: other.dimension,
            });
        }
        Ok(Quantity::new(self.value + other.value, self.dimension))
    }

    /// Magnitude expressed as a multiple of `unit`
    pub fn in_unit(&self, unit: &Unit) -> FormulaResult<f64> {
        if !self.dimension.is_compatible(&unit.dimension()) {
            return Err(FormulaError::IncompatibleDimensions {
                operation: format!("conversion to {}", unit.name()),
                left: self.dimension,
                right: unit.dimension(),
            });
        }
        Ok(self.value / unit.scale())
    }
}

impl Mul for Quantity {
    type Output = Quantity;
    fn mul(self, rhs: Quantity) -> Quantity {
        Quantity::new(self.value * rhs.value, self.dimension * rhs.dimension)
    }
}

impl Div for Quantity {
    type Output = Quantity;
    fn div(self, rhs: Quantity) -> Quantity {
        Quantity::new(self.value / rhs.value, self.dimension / rhs.dimension)
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;
    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(self.value * rhs, self.dimension)
    }
}

impl Mul<Quantity> for f64 {
    type Output = Quantity;
    fn mul(self, rhs: Quantity) -> Quantity {
        rhs * self
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;
    fn div(self, rhs: f64) -> Quantity {
        Quantity::new(self.value / rhs, self.dimension)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dimension.is_dimensionless() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.dimension)
        }
    }
}


/// A named unit of measurement
///
/// The expression keeps unit names as plain variables (`km/h` is `km/h`);
/// the quantity is what that expression resolves to in the registry the
/// unit was parsed with.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    name: String,
    expression: Expr,
    quantity: Quantity,
}

impl Unit {
    /// Parse a unit expression such as `m/s^2` with the given registry
    pub fn parse(text: &str, registry: &UnitRegistry) -> FormulaResult<Unit> {
        registry.parse_unit(text)
    }

    pub(crate) fn new(name: impl Into<String>, expression: Expr, quantity: Quantity) -> Unit {
        Unit {
            name: name.into(),
            expression,
            quantity,
        }
    }

    /// The unit `1`
    pub fn dimensionless() -> Unit {
        Unit::new("1", Expr::number(1.0), Quantity::dimensionless(1.0))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// SI scale factor of one unit
    pub fn scale(&self) -> f64 {
        self.quantity.value
    }

    pub fn dimension(&self) -> Dimension {
        self.quantity.dimension
    }

    pub fn is_dimensionless(&self) -> bool {
        self.quantity.dimension.is_dimensionless()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Mul<&Unit> for f64 {
    type Output = Quantity;
    fn mul(self, rhs: &Unit) -> Quantity {
        rhs.quantity * self
    }
}

/// Physical dimension of an expression
///
/// `lookup` gives the dimension of each variable; π and `e` are
/// dimensionless, and a variable `lookup` does not know is an
/// [`FormulaError::UnknownIdentifier`]. Sums require equal dimensions,
/// exponents must be dimensionless and, when the base carries a dimension,
/// constant.
pub fn dimension_of(
    expr: &Expr,
    lookup: impl Fn(&str) -> Option<Dimension>,
) -> FormulaResult<Dimension> {
    dimension_with(expr, &lookup)
}

fn dimension_with(
    expr: &Expr,
    lookup: &dyn Fn(&str) -> Option<Dimension>,
) -> FormulaResult<Dimension> {
    match expr.view() {
        ExprView::Number(_) => Ok(Dimension::DIMENSIONLESS),
        ExprView::Symbol(name) if is_math_constant(&name) => Ok(Dimension::DIMENSIONLESS),
        ExprView::Symbol(name) => {
            lookup(&*name).ok_or_else(|| FormulaError::UnknownIdentifier(name.into_owned()))
        }
        ExprView::Sum(terms) => {
            let mut dimensions = terms.iter().map(|term| dimension_with(term, lookup));
            let first = dimensions.next().unwrap_or(Ok(Dimension::DIMENSIONLESS))?;
            for dimension in dimensions {
                let dimension = dimension?;
                if !first.is_compatible(&dimension) {
                    return Err(FormulaError::IncompatibleDimensions {
                        operation: "addition".into(),
                        left: first,
                        right: dimension,
                    });
                }
            }
            Ok(first)
        }
        ExprView::Product(factors) => factors
            .iter()
            .try_fold(Dimension::DIMENSIONLESS, |acc, factor| {
                Ok(acc * dimension_with(factor, lookup)?)
            }),
        ExprView::Div(numerator, denominator) => {
            Ok(dimension_with(numerator, lookup)? / dimension_with(denominator, lookup)?)
        }
        ExprView::Pow(base, exponent) => {
            let b = dimension_with(base, lookup)?;
            let e = dimension_with(exponent, lookup)?;
            if !e.is_dimensionless() {
                return Err(FormulaError::IncompatibleDimensions {
                    operation: "exponent".into(),
                    left: b,
                    right: e,
                });
            }
            if b.is_dimensionless() {
                return Ok(Dimension::DIMENSIONLESS);
            }
            match constant_value(exponent) {
                Some(exponent) => Ok(b.powf(exponent)),
                None => Err(FormulaError::Evaluation(format!(
                    "exponent of a dimensioned base must be constant: {}",
                    exponent
                ))),
            }
        }
        ExprView::Function { name, args } => {
            let [arg] = args else {
                return Err(FormulaError::Evaluation(format!(
                    "{} takes one argument, got {}",
                    name,
                    args.len()
                )));
            };
            let d = dimension_with(arg, lookup)?;
            match name {
                "sqrt" => Ok(d.powf(0.5)),
                "cbrt" => Ok(d.powf(1.0 / 3.0)),
                "abs" => Ok(d),
                _ if d.is_dimensionless() => Ok(Dimension::DIMENSIONLESS),
                _ => Err(FormulaError::IncompatibleDimensions {
                    operation: name.to_string(),
                    left: d,
                    right: Dimension::DIMENSIONLESS,
                }),
            }
        }
        ExprView::Derivative { var, .. } => Err(FormulaError::Evaluation(format!(
            "unevaluated derivative by {} has no dimension",
            var
        ))),
    }
}
