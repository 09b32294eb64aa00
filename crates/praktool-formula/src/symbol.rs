//! Column symbols and their mapping onto expression variables

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use symb_anafis::Expr;

/// Counter for dummy symbol identities (0 is reserved for named symbols)
static DUMMY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifier of a column or placeholder inside an expression
///
/// Two named symbols are equal when their names are equal. A dummy symbol
/// carries a display name too, but only ever compares equal to itself (and
/// its clones).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: Arc<str>,
    dummy: u64,
}

impl Symbol {
    /// Create a named symbol
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            dummy: 0,
        }
    }

    /// Create a fresh placeholder symbol that is distinct from every other symbol
    pub fn dummy(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            dummy: DUMMY_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Display name of the symbol
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this symbol is a placeholder created by [`Symbol::dummy`]
    pub fn is_dummy(&self) -> bool {
        self.dummy != 0
    }

    /// Name of the expression variable standing for this symbol
    ///
    /// Dummies get a `#` suffix, which the formula lexer never produces, so
    /// a placeholder cannot collide with anything a user writes.
    pub fn var_name(&self) -> String {
        if self.is_dummy() {
            format!("{}#{}", self.name, self.dummy)
        } else {
            self.name.to_string()
        }
    }

    /// The symbol as an expression leaf
    pub fn to_expr(&self) -> Expr {
        Expr::symbol(self.var_name())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol::new(name)
    }
}

impl From<&Symbol> for Symbol {
    fn from(symbol: &Symbol) -> Self {
        symbol.clone()
    }
}

/// Shorthand for a named variable leaf
pub fn sym(name: impl AsRef<str>) -> Expr {
    Expr::symbol(name)
}

/// Names the expression layer always reads as π or Euler's number
pub fn is_math_constant(name: &str) -> bool {
    matches!(name, "pi" | "PI" | "Pi" | "e" | "E")
}
