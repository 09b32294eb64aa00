//! Statistics over column values

use crate::error::{Error, Result};

/// Sample mean and standard error of the mean
///
/// Returns `(Σx/n, sqrt((Σx²/n − (Σx/n)²)/(n−1)))`, with the variance summed
/// around the mean. Fewer than two values is an [`Error::InsufficientData`].
/// A constant sequence has exactly zero spread.
pub fn mean(data: &[f64]) -> Result<(f64, f64)> {
    let n = data.len();
    if n < 2 {
        return Err(Error::InsufficientData { needed: 2, got: n });
    }
    let first = data[0];
    if data.iter().all(|x| *x == first) {
        return Ok((first, 0.0));
    }

    let count = n as f64;
    let mean = data.iter().sum::<f64>() / count;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count;

    Ok((mean, (variance / (count - 1.0)).sqrt()))
}

/// Square root of the sum of squares
pub fn quadrature_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().map(|v| v * v).sum::<f64>().sqrt()
}
