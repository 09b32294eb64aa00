use praktool_formula::{evaluate, parse_expression, propagate_eval, EvaluationContext, PropagationInput};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn product_error_is_relative_quadrature(
        a in 0.5f64..100.0,
        b in 0.5f64..100.0,
        da in 0.0f64..1.0,
        db in 0.0f64..1.0,
    ) {
        let expr = parse_expression("a*b").unwrap();
        let (value, error) = propagate_eval(
            &expr,
            &[PropagationInput::new("a", a, da), PropagationInput::new("b", b, db)],
        ).unwrap();

        let expected = ((b * da).powi(2) + (a * db).powi(2)).sqrt();
        prop_assert!((value - a * b).abs() <= 1e-12 * value.abs());
        prop_assert!((error - expected).abs() <= 1e-9 * expected.max(1.0));
    }

    #[test]
    fn quotient_error_matches_hand_formula(
        x in -10.0f64..10.0,
        y in 0.5f64..10.0,
        dx in 0.0f64..1.0,
        dy in 0.0f64..1.0,
    ) {
        let expr = parse_expression("x/y").unwrap();
        let (value, error) = propagate_eval(
            &expr,
            &[PropagationInput::new("x", x, dx), PropagationInput::new("y", y, dy)],
        ).unwrap();

        let expected = ((dx / y).powi(2) + (x * dy / (y * y)).powi(2)).sqrt();
        prop_assert!((value - x / y).abs() <= 1e-12 * value.abs().max(1.0));
        prop_assert!(error >= 0.0);
        prop_assert!((error - expected).abs() <= 1e-9 * expected.max(1.0));
    }

    #[test]
    fn derivative_matches_difference_quotient(x in 0.5f64..5.0) {
        let expr = parse_expression("x^3 - 2*x + ln(x)").unwrap();
        let dx = expr.diff("x").unwrap();
        let ctx = EvaluationContext::new().with("x", x);
        let h = 1e-6;
        let f = |v: f64| evaluate(&expr, &EvaluationContext::new().with("x", v)).unwrap();
        let numeric = (f(x + h) - f(x - h)) / (2.0 * h);
        let symbolic = evaluate(&dx, &ctx).unwrap();
        prop_assert!((numeric - symbolic).abs() <= 1e-4 * symbolic.abs().max(1.0));
    }
}
