//! Named units and constants

use std::f64::consts::PI;
use std::sync::{Arc, OnceLock};

use ahash::{AHashMap, AHashSet};

use symb_anafis::Expr;

use super::{codata, dimension_of, Dimension, Quantity, Unit};
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::CompiledFormula;
use crate::parser::parse_expression;
use crate::symbol::is_math_constant;

/// SI prefixes; two-letter prefixes come first so `da` wins over `d`
const PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("µ", 1e-6),
    ("u", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
    ("y", 1e-24),
];

static SI_REGISTRY: OnceLock<Arc<UnitRegistry>> = OnceLock::new();

/// Shared SI registry used when a table is created without one
pub fn default_registry() -> Arc<UnitRegistry> {
    SI_REGISTRY
        .get_or_init(|| Arc::new(UnitRegistry::si()))
        .clone()
}

/// Immutable set of named units and constants
///
/// Registries are built up by value: `UnitRegistry::si().with_codata()`
/// produces a new registry and never touches one that is already shared.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: AHashMap<String, Quantity>,
    prefixable: AHashSet<String>,
    constants: AHashSet<String>,
}

impl UnitRegistry {
    /// A registry with no units at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// SI base and derived units plus common laboratory units
    pub fn si() -> Self {
        let m = Quantity::new(1.0, Dimension::LENGTH);
        let kg = Quantity::new(1.0, Dimension::MASS);
        let s = Quantity::new(1.0, Dimension::TIME);
        let a = Quantity::new(1.0, Dimension::CURRENT);
        let k = Quantity::new(1.0, Dimension::TEMPERATURE);
        let mol = Quantity::new(1.0, Dimension::AMOUNT);
        let cd = Quantity::new(1.0, Dimension::LUMINOSITY);
        let one = Quantity::dimensionless(1.0);

        let hz = one / s;
        let n = kg * m / (s * s);
        let pa = n / (m * m);
        let j = n * m;
        let w = j / s;
        let c = a * s;
        let v = w / a;
        let ohm = v / a;
        let f = c / v;
        let siemens = a / v;
        let wb = v * s;
        let t = wb / (m * m);
        let henry = wb / a;

        Self::empty()
            .with_prefixable_unit("m", m)
            .with_unit("kg", kg)
            .with_prefixable_unit("g", kg / 1000.0)
            .with_prefixable_unit("s", s)
            .with_prefixable_unit("A", a)
            .with_prefixable_unit("K", k)
            .with_prefixable_unit("mol", mol)
            .with_prefixable_unit("cd", cd)
            .with_prefixable_unit("Hz", hz)
            .with_prefixable_unit("N", n)
            .with_prefixable_unit("Pa", pa)
            .with_prefixable_unit("J", j)
            .with_prefixable_unit("W", w)
            .with_prefixable_unit("C", c)
            .with_prefixable_unit("V", v)
            .with_prefixable_unit("Ohm", ohm)
            .with_prefixable_unit("F", f)
            .with_prefixable_unit("S", siemens)
            .with_prefixable_unit("Wb", wb)
            .with_prefixable_unit("T", t)
            .with_prefixable_unit("H", henry)
            .with_prefixable_unit("L", m * m * m / 1000.0)
            .with_prefixable_unit("eV", j * 1.602176634e-19)
            .with_prefixable_unit("bar", pa * 1e5)
            .with_prefixable_unit("rad", one)
            .with_unit("sr", one)
            .with_unit("deg", one * (PI / 180.0))
            .with_unit("min", s * 60.0)
            .with_unit("h", s * 3600.0)
            .with_unit("day", s * 86400.0)
            .with_unit("inch", m * 0.0254)
            .with_unit("ft", m * 0.3048)
            .with_unit("mile", m * 1609.344)
            .with_unit("angstrom", m * 1e-10)
            .with_unit("atm", pa * 101325.0)
            .with_unit("torr", pa * (101325.0 / 760.0))
            .with_unit("percent", one * 0.01)
    }

    /// This registry extended with the CODATA physical constants
    pub fn with_codata(self) -> Self {
        codata::extend(self)
    }

    /// Add or replace a unit that does not accept SI prefixes
    pub fn with_unit(mut self, name: impl Into<String>, quantity: Quantity) -> Self {
        let name = name.into();
        self.prefixable.remove(&name);
        self.constants.remove(&name);
        self.units.insert(name, quantity);
        self
    }

    /// Add or replace a physical constant
    ///
    /// Constants behave like units without prefixes, but are meant to be
    /// written inside formulas (`qe*U/me`).
    pub fn with_constant(self, name: impl Into<String>, quantity: Quantity) -> Self {
        let name = name.into();
        let mut registry = self.with_unit(name.clone(), quantity);
        registry.constants.insert(name);
        registry
    }

    /// Add or replace a unit that accepts SI prefixes (`km`, `µs`, ...)
    pub fn with_prefixable_unit(mut self, name: impl Into<String>, quantity: Quantity) -> Self {
        let name = name.into();
        self.prefixable.insert(name.clone());
        self.constants.remove(&name);
        self.units.insert(name, quantity);
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Look up a unit by name, falling back to prefix resolution
    pub fn get(&self, name: &str) -> Option<Quantity> {
        if let Some(q) = self.units.get(name) {
            return Some(*q);
        }
        PREFIXES.iter().find_map(|(prefix, factor)| {
            let base = name.strip_prefix(prefix)?;
            if base.is_empty() || !self.prefixable.contains(base) {
                return None;
            }
            self.units.get(base).map(|q| *q * *factor)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether `name` was registered with [`UnitRegistry::with_constant`]
    pub fn is_constant(&self, name: &str) -> bool {
        self.constants.contains(name)
    }

    /// Parse unit text such as `kg*m/s^2`; empty text is the unit `1`
    pub fn parse_unit(&self, text: &str) -> FormulaResult<Unit> {
        let text = text.trim();
        if text.is_empty() || text == "1" {
            return Ok(Unit::dimensionless());
        }
        let expression = parse_expression(text)?;
        let quantity = self.quantity_of(&expression)?;
        Ok(Unit::new(text, expression, quantity))
    }

    /// Quantity of an expression made only of numbers and registry names
    pub fn quantity_of(&self, expr: &Expr) -> FormulaResult<Quantity> {
        let mut params = Vec::new();
        let mut args = Vec::new();
        for name in expr.variables() {
            if is_math_constant(&name) {
                continue;
            }
            let quantity = self
                .get(&name)
                .ok_or_else(|| FormulaError::UnknownUnit(name.clone()))?;
            args.push(quantity.value());
            params.push(name);
        }

        let dimension = dimension_of(expr, |name| self.get(name).map(|q| q.dimension()))?;
        let value = CompiledFormula::compile(expr, params)?.evaluate(&args);
        Ok(Quantity::new(value, dimension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
    }

    #[test]
    fn test_prefixes() {
        let registry = UnitRegistry::si();
        assert!(close(registry.get("km").unwrap().value(), 1000.0));
        assert!(close(registry.get("µs").unwrap().value(), 1e-6));
        assert!(close(registry.get("us").unwrap().value(), 1e-6));
        assert!(close(registry.get("mg").unwrap().value(), 1e-6));
        assert!(close(registry.get("dam").unwrap().value(), 10.0));
        // direct names win over prefix resolution
        assert!(close(registry.get("min").unwrap().value(), 60.0));
        assert!(close(registry.get("mol").unwrap().value(), 1.0));
        // non-prefixable units
        assert!(registry.get("kmin").is_none());
        assert!(registry.get("kkg").is_none());
    }

    #[test]
    fn test_parse_unit_expression() {
        let registry = UnitRegistry::si();
        let unit = registry.parse_unit("kg*m/s^2").unwrap();
        assert_eq!(unit.name(), "kg*m/s^2");
        assert!(unit.dimension().is_compatible(&registry.get("N").unwrap().dimension()));

        let square = registry.parse_unit("m*m").unwrap();
        assert!(square.dimension().is_compatible(&Dimension::LENGTH.powf(2.0)));

        assert!(registry.parse_unit("").unwrap().is_dimensionless());
        assert!(matches!(
            registry.parse_unit("furlong"),
            Err(FormulaError::UnknownUnit(name)) if name == "furlong"
        ));
    }

    #[test]
    fn test_with_codata_leaves_original_untouched() {
        let si = UnitRegistry::si();
        let extended = si.clone().with_codata();
        assert!(!si.contains("me"));
        assert!(extended.contains("me"));
        assert!(extended.len() > si.len());
    }

    #[test]
    fn test_quantity_of_scaled_units() {
        let registry = UnitRegistry::si();
        let kmh = registry.parse_unit("km/h").unwrap();
        assert!(close(kmh.scale(), 1000.0 / 3600.0));
        assert!(kmh.dimension().is_compatible(&(Dimension::LENGTH / Dimension::TIME)));

        let full_turn = registry.parse_unit("360*deg").unwrap();
        assert!(close(full_turn.scale(), 2.0 * PI));
        assert!(full_turn.is_dimensionless());
    }

    #[test]
    fn test_constants_are_marked() {
        let registry = UnitRegistry::si().with_codata();
        assert!(registry.is_constant("qe"));
        assert!(registry.is_constant("c"));
        assert!(!registry.is_constant("s"));
        // a plain unit of the same name replaces the constant
        let patched = registry.with_unit("c", Quantity::dimensionless(1.0));
        assert!(!patched.is_constant("c"));
    }
}
