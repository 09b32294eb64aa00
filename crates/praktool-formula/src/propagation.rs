//! Gaussian error propagation
//!
//! For uncorrelated inputs the propagated uncertainty is
//! `σ_f = sqrt(Σᵢ (∂f/∂xᵢ · σᵢ)²)`. The formula itself comes from
//! [`symb_anafis::uncertainty_propagation`] with a diagonal covariance
//! matrix whose entries are the squared error placeholders.

use symb_anafis::{uncertainty_propagation, CovEntry, CovarianceMatrix, Expr};

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{evaluate, EvaluationContext};
use crate::symbol::Symbol;

/// Build the propagated-error expression for `expr`
///
/// `pairs` maps each variable to the symbol that stands for its error.
/// Variables the expression does not depend on contribute nothing; with no
/// contributing variable the result is `0`. The simplifier may pull a
/// square root apart into a signed product, so callers take the absolute
/// value of what this evaluates to.
pub fn build_error_expression(expr: &Expr, pairs: &[(Symbol, Symbol)]) -> FormulaResult<Expr> {
    let used: Vec<&(Symbol, Symbol)> = pairs
        .iter()
        .filter(|(var, _)| expr.contains_var(&var.var_name()))
        .collect();
    if used.is_empty() {
        return Ok(Expr::number(0.0));
    }

    let names: Vec<String> = used.iter().map(|(var, _)| var.var_name()).collect();
    let variables: Vec<&str> = names.iter().map(String::as_str).collect();
    let covariance = CovarianceMatrix::diagonal(
        used.iter()
            .map(|(_, error)| CovEntry::Symbolic(error.to_expr().pow(2.0)))
            .collect(),
    );

    uncertainty_propagation(expr, &variables, Some(&covariance))
        .map_err(|e| FormulaError::Evaluation(format!("error propagation for {}: {}", expr, e)))
}

/// One input of [`propagate_eval`]
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationInput {
    pub symbol: Symbol,
    pub value: f64,
    pub error: f64,
}

impl PropagationInput {
    pub fn new(symbol: impl Into<Symbol>, value: f64, error: f64) -> Self {
        Self {
            symbol: symbol.into(),
            value,
            error,
        }
    }
}

/// Evaluate `expr` and its propagated error for a single set of inputs
///
/// Returns `(value, error)`.
pub fn propagate_eval(expr: &Expr, inputs: &[PropagationInput]) -> FormulaResult<(f64, f64)> {
    let mut ctx = EvaluationContext::new();
    let mut pairs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let error_symbol = Symbol::dummy(format!("δ{}", input.symbol));
        ctx.bind(input.symbol.clone(), input.value);
        ctx.bind(error_symbol.clone(), input.error);
        pairs.push((input.symbol.clone(), error_symbol));
    }

    let value = evaluate(expr, &ctx)?;
    let error = evaluate(&build_error_expression(expr, &pairs)?, &ctx)?.abs();
    Ok((value, error))
}
