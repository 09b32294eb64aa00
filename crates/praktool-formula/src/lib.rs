//! # praktool-formula
//!
//! Formula layer of praktool on top of the symb_anafis computer-algebra
//! library, which does the parsing, differentiation and simplification.
//!
//! This crate adds:
//! - Column symbols and their mapping onto expression variables
//! - Numeric evaluation of compiled expressions
//! - Physical dimensions, units and a unit registry with CODATA constants
//! - Gaussian error propagation formulas
//! - Dependency tracking for derived columns
//!
//! ## Example
//!
//! ```rust
//! use praktool_formula::{parse_expression, propagate_eval, PropagationInput};
//!
//! let expr = parse_expression("x*y").unwrap();
//! let (value, error) = propagate_eval(
//!     &expr,
//!     &[PropagationInput::new("x", 2.0, 0.1), PropagationInput::new("y", 3.0, 0.0)],
//! )
//! .unwrap();
//! assert_eq!(value, 6.0);
//! assert!((error - 0.3).abs() < 1e-12);
//! ```

pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod propagation;
pub mod symbol;
pub mod units;

pub use dependency::{CycleError, DependencyGraph};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, CompiledFormula, EvaluationContext};
pub use parser::parse_expression;
pub use propagation::{build_error_expression, propagate_eval, PropagationInput};
pub use symb_anafis::Expr;
pub use symbol::{is_math_constant, sym, Symbol};
pub use units::{default_registry, dimension_of, Dimension, Quantity, Unit, UnitRegistry};
