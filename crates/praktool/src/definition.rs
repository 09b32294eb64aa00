//! Derived column definitions written as `name[unit] = formula`

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A derived column definition
///
/// The unit part is optional; `n = a/b` defines a dimensionless column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub unit: String,
    pub formula: String,
}

impl Definition {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            formula: formula.into(),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidDefinition {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        let (target, formula) = text
            .split_once('=')
            .ok_or_else(|| invalid("missing '='"))?;
        let formula = formula.trim();
        if formula.is_empty() {
            return Err(invalid("empty formula"));
        }

        let target = target.trim();
        let (name, unit) = match target.split_once('[') {
            Some((name, rest)) => {
                let unit = rest
                    .strip_suffix(']')
                    .ok_or_else(|| invalid("unterminated unit, expected ']'"))?;
                (name.trim(), unit.trim())
            }
            None => (target, ""),
        };
        if name.is_empty() {
            return Err(invalid("missing column name"));
        }

        Ok(Self::new(name, unit, formula))
    }
}

impl FromStr for Definition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{} = {}", self.name, self.formula)
        } else {
            write!(f, "{}[{}] = {}", self.name, self.unit, self.formula)
        }
    }
}
