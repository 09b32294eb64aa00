//! Integration tests for tables, derived columns and column operations

use std::collections::BTreeMap;
use std::sync::Arc;

use praktool_core::formula::{sym, Symbol, UnitRegistry};
use praktool_core::{
    Attachments, Column, Error, JoinOptions, Reading, Table, UncertaintyKind,
};
use pretty_assertions::assert_eq;

fn seq(n: i32) -> Vec<f64> {
    (0..n).map(f64::from).collect()
}

#[test]
fn test_measurement_rows_are_unitless() {
    let table = Table::new();
    let cm = table.unit("cm").unwrap();
    let m = table.unit("m").unwrap();

    let readings: Vec<_> = (0..10).map(|i| f64::from(i) * &m).collect();
    let column = Column::measurement_from("x", cm, readings).unwrap();

    assert_eq!(column.len(), 10);
    for (i, (value, attachments)) in column.iter().enumerate() {
        assert!((value - 100.0 * i as f64).abs() < 1e-9);
        assert!(attachments.is_empty());
    }
}

#[test]
fn test_repeated_readings_store_mean_and_sem() {
    let table = Table::new();
    let s = table.unit("s").unwrap();
    let mut column = Column::measurement("T", s.clone());
    column
        .append(Reading::Repeated(vec![1.0 * &s, 3.0 * &s]))
        .unwrap();
    column
        .append(Reading::Repeated(vec![2.0 * &s, 2.0 * &s, 2.0 * &s]))
        .unwrap();

    assert_eq!(column.data(), &[2.0, 2.0]);
    let stat = column.attachment(UncertaintyKind::Statistical).unwrap();
    assert!((stat.data()[0] - 1.0).abs() < 1e-12);
    assert_eq!(stat.data()[1], 0.0);
}

#[test]
fn test_derivate_incompatible_unit() {
    let mut table = Table::new();
    let m = table.unit("m").unwrap();
    table.add(Column::measurement_raw("x", m, seq(10))).unwrap();

    let kg = table.unit("kg").unwrap();
    let err = table.derivate("y", kg, sym("x") * 2.0).unwrap_err();
    assert!(matches!(err, Error::IncompatibleUnit { .. }), "{err}");
}

#[test]
fn test_derivate_unknown_symbol() {
    let mut table = Table::new();
    let m = table.unit("m").unwrap();
    table.add(Column::measurement_raw("x", m.clone(), seq(10))).unwrap();

    let err = table.derivate("y", m, sym("x") * sym("q")).unwrap_err();
    assert!(matches!(err, Error::UnknownSymbol(ref name) if name == "q"), "{err}");
}

#[test]
fn test_derivate_formula_unknown_name() {
    let mut table = Table::new();
    let m = table.unit("m").unwrap();
    table.add(Column::measurement_raw("x", m, seq(10))).unwrap();

    let err = table.derivate_formula("y", "m", "x*q").unwrap_err();
    assert!(matches!(err, Error::UnknownSymbol(ref name) if name == "q"), "{err}");
    let err = table.parse_formula("mass*x").unwrap_err();
    assert!(matches!(err, Error::UnknownSymbol(ref name) if name == "mass"), "{err}");
    assert!(!table.contains("y"));
}

#[test]
fn test_unit_leaves_are_recorded() {
    let mut table = Table::new();
    let m = table.unit("m").unwrap();
    table.add(Column::measurement_raw("x", m, [1.0, 2.0])).unwrap();

    // "s" is no column, so it is read as the unit second
    let v = table.derivate_formula("v", "m/s", "x/s").unwrap();
    let units = v.derivation().unwrap().units();
    assert_eq!(units.keys().collect::<Vec<_>>(), vec!["s"]);
    assert!(!table.registry().is_constant("s"));

    table.update("v", false).unwrap();
    assert_eq!(table.column("v").unwrap().data(), &[1.0, 2.0]);
}

#[test]
fn test_codata_constants_in_formulas() {
    let mut table = Table::with_registry(Arc::new(UnitRegistry::si().with_codata()));
    let kg = table.unit("kg").unwrap();
    table.add(Column::measurement_raw("mass", kg, [1.0])).unwrap();

    let energy = table.derivate_formula("E0", "J", "mass*c^2").unwrap();
    assert!(energy.derivation().unwrap().units().contains_key("c"));
    assert!(table.registry().is_constant("c"));

    table.update_all().unwrap();
    let c = 299792458.0f64;
    let value = table.column("E0").unwrap().data()[0];
    assert!((value - c * c).abs() <= 1e-9 * c * c);
}

#[test]
fn test_update_with_constant_factor() {
    let mut table = Table::new();
    let m = table.unit("m").unwrap();
    let one = table.unit("1").unwrap();
    table.add(Column::measurement_raw("x", m.clone(), seq(10))).unwrap();
    table
        .add_constant("a", one, praktool_core::formula::Quantity::dimensionless(1.0), &BTreeMap::new(), 10)
        .unwrap();

    table.derivate("y", m, sym("a") * sym("x")).unwrap();
    table.update("y", true).unwrap();

    let rows: Vec<(f64, Attachments)> = table.column("y").unwrap().iter().collect();
    let expected: Vec<(f64, Attachments)> = seq(10).into_iter().map(|v| (v, Attachments::new())).collect();
    assert_eq!(rows, expected);
}

#[test]
fn test_update_all_doubles() {
    let mut table = Table::new();
    let s = table.unit("s").unwrap();
    table.add(Column::measurement_raw("x", s, seq(10))).unwrap();
    table.derivate_formula("y", "s", "2*x").unwrap();

    let stats = table.update_all().unwrap();
    assert_eq!(stats.columns_visited, 2);
    assert_eq!(stats.columns_updated, 1);
    assert_eq!(stats.rows_computed, 10);

    let expected: Vec<f64> = (0..10).map(|i| f64::from(2 * i)).collect();
    assert_eq!(table.column("y").unwrap().data(), expected.as_slice());
}

#[test]
fn test_update_all_follows_chains() {
    let mut table = Table::new();
    let s = table.unit("s").unwrap();
    table.add(Column::measurement_raw("t", s, seq(4))).unwrap();
    table.derivate_formula("u", "s", "t + t").unwrap();
    table.derivate_formula("w", "s", "u + t").unwrap();

    // "w" is the last column, but its source "u" must be computed first
    table.update_all().unwrap();
    assert_eq!(table.column("w").unwrap().data(), &[0.0, 3.0, 6.0, 9.0]);
}

#[test]
fn test_shallow_update_keeps_filled_sources() {
    let mut table = Table::new();
    let s = table.unit("s").unwrap();
    table.add(Column::measurement_raw("x", s, [0.0, 1.0, 2.0])).unwrap();
    table.derivate_formula("u", "s", "2*x").unwrap();
    table.derivate_formula("w", "s", "3*u").unwrap();
    table.update_all().unwrap();
    assert_eq!(table.column("w").unwrap().data(), &[0.0, 6.0, 12.0]);

    table
        .column_mut("x")
        .unwrap()
        .raw_append(3.0, &Attachments::new())
        .unwrap();

    // "u" still has rows, so a shallow update leaves it and "w" stale
    table.update("w", false).unwrap();
    assert_eq!(table.column("u").unwrap().len(), 3);
    assert_eq!(table.column("w").unwrap().data(), &[0.0, 6.0, 12.0]);

    table.update("w", true).unwrap();
    assert_eq!(table.column("u").unwrap().data(), &[0.0, 2.0, 4.0, 6.0]);
    assert_eq!(table.column("w").unwrap().data(), &[0.0, 6.0, 12.0, 18.0]);
}

#[test]
fn test_update_all_reports_cycle() {
    let mut table = Table::new();
    let m = table.unit("m").unwrap();
    table
        .add(Column::derived("A", m.clone(), [Symbol::new("B")].into(), sym("B")))
        .unwrap();
    table
        .add(Column::derived("B", m, [Symbol::new("A")].into(), sym("A")))
        .unwrap();

    match table.update_all() {
        Err(Error::CyclicReference { cycle }) => {
            assert!(cycle.contains(&"A".to_string()));
            assert!(cycle.contains(&"B".to_string()));
        }
        other => panic!("expected a cyclic reference, got {other:?}"),
    }
}

#[test]
fn test_diff_of_sequence() {
    let mut table = Table::new();
    let m = table.unit("m").unwrap();
    table.add(Column::measurement_raw("x", m, seq(10))).unwrap();

    let dx = table.diff("x", "dx", 1).unwrap();
    assert_eq!(dx.data(), vec![1.0; 9].as_slice());
}

#[test]
fn test_diff_rejects_attachments() {
    let mut table = Table::new();
    let m = table.unit("m").unwrap();
    table.add(Column::measurement_raw("x", m, seq(10))).unwrap();
    table
        .column_mut("x")
        .unwrap()
        .new_attachment(UncertaintyKind::Statistical, Some(0.1))
        .unwrap();

    assert!(matches!(
        table.diff("x", "dx", 1),
        Err(Error::AttachmentsNotSupported { operation: "diff", .. })
    ));
    assert!(matches!(
        table.integrate("x", "X", 0, 2),
        Err(Error::AttachmentsNotSupported { .. })
    ));
}

#[test]
fn test_integrate_pairs() {
    let mut table = Table::new();
    let j = table.unit("J").unwrap();
    table
        .add(Column::measurement_raw("y", j, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
        .unwrap();

    let integrated = table.integrate("y", "Y", 0, 2).unwrap();
    assert_eq!(integrated.data(), &[3.0, 7.0, 11.0]);
}

#[test]
fn test_join_mean_and_sem() {
    let mut table = Table::new();
    let v = table.unit("V").unwrap();
    table.add(Column::measurement_raw("c1", v.clone(), [1.0, 3.0])).unwrap();
    table.add(Column::measurement_raw("c2", v, [3.0, 1.0])).unwrap();

    let joined = table
        .join("z", &["c1", "c2"], &JoinOptions::default())
        .unwrap();
    assert_eq!(joined.data(), &[2.0, 2.0]);
    let stat = joined.attachment(UncertaintyKind::Statistical).unwrap();
    assert!(stat.data().iter().all(|e| (e - 1.0).abs() < 1e-12));
}

#[test]
fn test_density_from_mass_and_volume() {
    let mut table = Table::new();
    let g = table.unit("g").unwrap();
    let cm3 = table.unit("cm^3").unwrap();
    let mut m = Column::measurement_raw("m", g, [10.0, 20.0]);
    m.new_attachment(UncertaintyKind::Statistical, Some(0.1)).unwrap();
    table.add(m).unwrap();
    table.add(Column::measurement_raw("V", cm3, [2.0, 4.0])).unwrap();

    table.derivate_formula("rho", "kg/m^3", "m/V").unwrap();
    table.update_all().unwrap();

    let rho = table.column("rho").unwrap();
    assert_eq!(rho.len(), 2);
    assert!((rho.data()[0] - 5000.0).abs() < 1e-6);
    assert!((rho.data()[1] - 5000.0).abs() < 1e-6);
    // 0.1 g out of 10 g is 1 percent
    let stat = rho.attachment(UncertaintyKind::Statistical).unwrap();
    assert!((stat.data()[0] - 50.0).abs() < 1e-6);
}

#[test]
fn test_velocity_from_differences() {
    let mut table = Table::new();
    let m = table.unit("m").unwrap();
    let s = table.unit("s").unwrap();
    table.add(Column::measurement_raw("x", m, seq(10))).unwrap();
    table.add(Column::measurement_raw("t", s, seq(10))).unwrap();

    table.diff("x", "dx", 1).unwrap();
    table.diff("t", "dt", 1).unwrap();
    table.derivate_formula("v", "m/s", "dx/dt").unwrap();
    table.update("v", false).unwrap();

    let rows: Vec<_> = table.column("v").unwrap().iter().collect();
    assert_eq!(rows, vec![(1.0, Attachments::new()); 9]);
}

#[test]
fn test_statistical_and_systematic_are_propagated_separately() {
    let mut table = Table::new();
    let v = table.unit("V").unwrap();
    let mut u = Column::measurement("U", v);
    u.new_attachment(UncertaintyKind::Statistical, Some(0.0)).unwrap();
    let mut row = Attachments::new();
    row.insert(UncertaintyKind::Statistical, 0.3);
    u.raw_append(10.0, &row).unwrap();
    u.attach_relative(UncertaintyKind::Systematic, 0.01, false).unwrap();
    table.add(u).unwrap();

    table.derivate_formula("P", "W", "U^2/(5*Ohm)").unwrap();
    table.update_all().unwrap();

    let (value, errors) = table.column("P").unwrap().iter().next().unwrap();
    assert!((value - 20.0).abs() < 1e-9);
    // dP/dU = 2U/R = 4 W/V
    assert!((errors[&UncertaintyKind::Statistical] - 1.2).abs() < 1e-9);
    assert!((errors[&UncertaintyKind::Systematic] - 0.4).abs() < 1e-9);
}
