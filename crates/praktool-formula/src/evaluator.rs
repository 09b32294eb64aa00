//! Numeric evaluation
//!
//! Expressions are compiled to symb_anafis bytecode. Arithmetic follows
//! IEEE 754, so a division by zero yields an infinity rather than an error.

use std::collections::HashMap;
use std::fmt;

use symb_anafis::{CompiledEvaluator, Expr};

use crate::error::{FormulaError, FormulaResult};
use crate::symbol::{is_math_constant, Symbol};

/// Symbol bindings for numeric evaluation
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    values: HashMap<String, f64>,
}

impl EvaluationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `symbol` to `value`, replacing any previous binding
    pub fn bind(&mut self, symbol: impl Into<Symbol>, value: f64) -> &mut Self {
        self.values.insert(symbol.into().var_name(), value);
        self
    }

    /// Builder-style variant of [`EvaluationContext::bind`]
    pub fn with(mut self, symbol: impl Into<Symbol>, value: f64) -> Self {
        self.bind(symbol, value);
        self
    }

    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.values.get(&symbol.var_name()).copied()
    }
}

/// An expression compiled against a fixed parameter order
///
/// Compile once and evaluate for many rows.
pub struct CompiledFormula {
    evaluator: CompiledEvaluator,
    params: Vec<String>,
}

impl CompiledFormula {
    /// Compile `expr`; every variable that is not π or `e` must be in `params`
    pub fn compile(expr: &Expr, params: Vec<String>) -> FormulaResult<Self> {
        let evaluator = CompiledEvaluator::compile(expr, params.as_slice(), None)
            .map_err(|e| FormulaError::Evaluation(format!("{} in {}", e, expr)))?;
        Ok(Self { evaluator, params })
    }

    /// Evaluate with `args` in parameter order
    pub fn evaluate(&self, args: &[f64]) -> f64 {
        self.evaluator.evaluate(args)
    }
}

impl fmt::Debug for CompiledFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFormula")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Evaluate an expression to a number
pub fn evaluate(expr: &Expr, ctx: &EvaluationContext) -> FormulaResult<f64> {
    let mut params = Vec::new();
    let mut args = Vec::new();
    for name in expr.variables() {
        if is_math_constant(&name) {
            continue;
        }
        let value = ctx
            .values
            .get(&name)
            .copied()
            .ok_or_else(|| FormulaError::Evaluation(format!("Unbound symbol '{}'", name)))?;
        params.push(name);
        args.push(value);
    }
    Ok(CompiledFormula::compile(expr, params)?.evaluate(&args))
}

/// Value of an expression without variables, if it is one
pub(crate) fn constant_value(expr: &Expr) -> Option<f64> {
    if let Some(n) = expr.as_number() {
        return Some(n);
    }
    if expr.variables().iter().any(|name| !is_math_constant(name)) {
        return None;
    }
    CompiledFormula::compile(expr, Vec::new())
        .ok()
        .map(|formula| formula.evaluate(&[]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    fn eval(text: &str, ctx: &EvaluationContext) -> f64 {
        evaluate(&parse_expression(text).unwrap(), ctx).unwrap()
    }

    #[test]
    fn test_arithmetic() {
        let ctx = EvaluationContext::new();
        assert_eq!(eval("1 + 2*3", &ctx), 7.0);
        assert_eq!(eval("(1 + 2)*3", &ctx), 9.0);
        assert_eq!(eval("2^10", &ctx), 1024.0);
        assert_eq!(eval("sqrt(16)", &ctx), 4.0);
        assert!((eval("2*pi", &ctx) - std::f64::consts::TAU).abs() < 1e-12);
    }

    #[test]
    fn test_symbols() {
        let ctx = EvaluationContext::new().with("x", 3.0).with("y", 4.0);
        assert_eq!(eval("sqrt(x^2 + y^2)", &ctx), 5.0);
        assert_eq!(ctx.get(&Symbol::new("x")), Some(3.0));

        let missing = evaluate(&parse_expression("x + z").unwrap(), &ctx);
        assert!(matches!(missing, Err(FormulaError::Evaluation(_))));
    }

    #[test]
    fn test_compiled_formula_follows_param_order() {
        let expr = parse_expression("a - b").unwrap();
        let formula = CompiledFormula::compile(&expr, vec!["b".into(), "a".into()]).unwrap();
        assert!(format!("{:?}", formula).contains("[\"b\", \"a\"]"));
        assert_eq!(formula.evaluate(&[1.0, 5.0]), 4.0);
    }

    #[test]
    fn test_dummy_bindings() {
        let dx = Symbol::dummy("δx");
        let ctx = EvaluationContext::new().with(&dx, 0.5);
        let expr = 2.0 * dx.to_expr();
        assert_eq!(evaluate(&expr, &ctx).unwrap(), 1.0);
        assert_eq!(ctx.get(&Symbol::new("δx")), None);
    }
}
