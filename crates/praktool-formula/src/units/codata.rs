//! CODATA 2018 recommended values

use super::{Dimension, Quantity, UnitRegistry};

/// Add the fundamental constants to `registry`
pub(super) fn extend(registry: UnitRegistry) -> UnitRegistry {
    let m = Dimension::LENGTH;
    let kg = Dimension::MASS;
    let s = Dimension::TIME;
    let a = Dimension::CURRENT;
    let k = Dimension::TEMPERATURE;
    let mol = Dimension::AMOUNT;

    let joule = kg * m * m / (s * s);
    let coulomb = a * s;

    registry
        // elementary charge; `e` itself is Euler's number in formulas
        .with_constant("qe", Quantity::new(1.602176634e-19, coulomb))
        // electron and proton rest mass
        .with_constant("me", Quantity::new(9.1093837015e-31, kg))
        .with_constant("mp", Quantity::new(1.67262192369e-27, kg))
        .with_constant("rydberg", Quantity::new(10973731.568160, m.recip()))
        .with_constant("c", Quantity::new(299792458.0, m / s))
        .with_constant("planck", Quantity::new(6.62607015e-34, joule * s))
        .with_constant("hbar", Quantity::new(1.054571817e-34, joule * s))
        .with_constant("boltzmann", Quantity::new(1.380649e-23, joule / k))
        .with_constant("avogadro", Quantity::new(6.02214076e23, mol.recip()))
        // vacuum permittivity (F/m) and permeability (N/A^2)
        .with_constant(
            "eps0",
            Quantity::new(8.8541878128e-12, coulomb * coulomb / (joule * m)),
        )
        .with_constant(
            "mu0",
            Quantity::new(1.25663706212e-6, kg * m / (s * s) / (a * a)),
        )
        .with_constant("G", Quantity::new(6.67430e-11, m * m * m / (kg * s * s)))
        // standard gravity
        .with_constant("gn", Quantity::new(9.80665, m / (s * s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_have_expected_dimensions() {
        let registry = UnitRegistry::si().with_codata();
        let qe = registry.get("qe").unwrap();
        let coulomb = registry.get("C").unwrap();
        assert!(qe.dimension().is_compatible(&coulomb.dimension()));

        let eps0 = registry.get("eps0").unwrap();
        let farad_per_metre = registry.parse_unit("F/m").unwrap();
        assert!(eps0.dimension().is_compatible(&farad_per_metre.dimension()));

        // c^2 * mu0 * eps0 == 1
        let c = registry.get("c").unwrap();
        let mu0 = registry.get("mu0").unwrap();
        let product = c * c * mu0 * eps0;
        assert!(product.dimension().is_dimensionless());
        assert!((product.value() - 1.0).abs() < 1e-9);
    }
}
