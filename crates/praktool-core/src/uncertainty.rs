//! Uncertainty kinds

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Kind of uncertainty attached to column values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UncertaintyKind {
    /// Estimated from the scatter of repeated readings
    Statistical,
    /// Known instrument or method bias, supplied by the user
    Systematic,
}

/// Per-row uncertainty values keyed by kind
pub type Attachments = BTreeMap<UncertaintyKind, f64>;

impl UncertaintyKind {
    pub const ALL: [UncertaintyKind; 2] = [UncertaintyKind::Statistical, UncertaintyKind::Systematic];

    /// Value used for rows that do not specify this kind
    pub fn default_value(self) -> f64 {
        0.0
    }

    pub fn name(self) -> &'static str {
        match self {
            UncertaintyKind::Statistical => "statistical",
            UncertaintyKind::Systematic => "systematic",
        }
    }
}

impl fmt::Display for UncertaintyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UncertaintyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stat" | "statistical" => Ok(UncertaintyKind::Statistical),
            "sys" | "syst" | "systematic" => Ok(UncertaintyKind::Systematic),
            other => Err(Error::InvalidArgument(format!(
                "unknown uncertainty kind '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("stat".parse::<UncertaintyKind>().unwrap(), UncertaintyKind::Statistical);
        assert_eq!("Systematic".parse::<UncertaintyKind>().unwrap(), UncertaintyKind::Systematic);
        assert!("random".parse::<UncertaintyKind>().is_err());
        assert_eq!(UncertaintyKind::Statistical.default_value(), 0.0);
    }
}
