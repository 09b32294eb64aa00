//! Formula parsing
//!
//! Text is handed to the symb_anafis parser. Every multi-letter identifier
//! of the formula is declared up front so the lexer keeps `mass` whole
//! instead of reading it as `m*a*s*s`.

use std::collections::HashSet;

use lazy_regex::regex;
use symb_anafis::Expr;

use crate::error::{FormulaError, FormulaResult};

/// Single-argument functions a formula may call
pub const FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh", "exp", "ln", "log10",
    "log2", "sqrt", "cbrt", "abs",
];

/// Parse a formula string into an expression
///
/// Identifiers stay plain variables; deciding whether a name is a column or
/// a unit is left to the caller. `**` is accepted as `^`.
///
/// # Example
/// ```rust
/// use praktool_formula::parse_expression;
///
/// let expr = parse_expression("2*x + 1").unwrap();
/// assert!(expr.contains_var("x"));
/// let expr = parse_expression("sqrt(v^2 + w**2) / s").unwrap();
/// ```
pub fn parse_expression(text: &str) -> FormulaResult<Expr> {
    let text = text.trim();
    if text.is_empty() {
        return Err(FormulaError::Parse("empty formula".into()));
    }

    let mut known = HashSet::new();
    for found in regex!(r"\b[^\W\d]\w*(\s*\()?").captures_iter(text) {
        let name = &found[0];
        match found.get(1) {
            Some(paren) => {
                let function = name[..name.len() - paren.as_str().len()].to_string();
                if !FUNCTIONS.contains(&function.as_str()) {
                    return Err(FormulaError::Parse(format!(
                        "unknown function '{}' in '{}'",
                        function, text
                    )));
                }
            }
            None => {
                known.insert(name.to_string());
            }
        }
    }

    let expr = symb_anafis::parse(text, &known, &HashSet::new(), None)
        .map_err(|e| FormulaError::Parse(format!("{} in '{}'", e, text)))?;
    tracing::trace!("Parsed '{}' as {}", text, expr);
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{evaluate, EvaluationContext};

    fn eval(text: &str, ctx: &EvaluationContext) -> f64 {
        evaluate(&parse_expression(text).unwrap(), ctx).unwrap()
    }

    #[test]
    fn test_parse_numbers_and_precedence() {
        let ctx = EvaluationContext::new().with("x", 4.0);
        assert_eq!(eval("42", &ctx), 42.0);
        assert_eq!(eval("3.5e2", &ctx), 350.0);
        assert_eq!(eval("1 + 2 * x", &ctx), 9.0);
        assert_eq!(eval("(1 + 2) * x", &ctx), 12.0);
        assert_eq!(eval("x^2", &ctx), eval("x**2", &ctx));
        assert_eq!(eval("-x^2", &ctx), -16.0);
    }

    #[test]
    fn test_multi_letter_identifiers_stay_whole() {
        let expr = parse_expression("mass*s + v_1/λ").unwrap();
        let mut names: Vec<String> = expr.variables().into_iter().collect();
        names.sort();
        assert_eq!(names, vec!["mass", "s", "v_1", "λ"]);
    }

    #[test]
    fn test_functions() {
        let ctx = EvaluationContext::new().with("x", 3.0).with("y", 4.0);
        assert_eq!(eval("sqrt(x^2 + y^2)", &ctx), 5.0);

        assert!(matches!(
            parse_expression("frobnicate(x)"),
            Err(FormulaError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("1 +").is_err());
        assert!(parse_expression("(x").is_err());
        assert!(parse_expression("x # 2").is_err());
    }
}
