//! Column operations that produce new measurement columns

use crate::column::Column;
use crate::error::{Error, Result};
use crate::stats;
use crate::table::{ColumnKey, Table};
use crate::uncertainty::{Attachments, UncertaintyKind};
use praktool_formula::Symbol;

/// Differences of consecutive elements of a strided subsequence
///
/// Skips `skip` leading values, keeps every `n`-th value of the rest and
/// returns the differences of neighbours. Fewer than two kept values give an
/// empty result.
pub fn diff_nth(values: &[f64], n: usize, skip: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let picked: Vec<f64> = values.iter().skip(skip).step_by(n).copied().collect();
    picked.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Sums of consecutive non-overlapping runs of `n` values
///
/// Skips `skip` leading values; an incomplete trailing run is dropped.
pub fn int_nth(values: &[f64], n: usize, skip: usize) -> Vec<f64> {
    if n == 0 || skip >= values.len() {
        return Vec::new();
    }
    values[skip..]
        .chunks_exact(n)
        .map(|chunk| chunk.iter().sum())
        .collect()
}

/// Options for [`Table::join`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinOptions {
    /// Carry the average of the sources' systematic errors over
    pub propagate_systematic: bool,
    /// Added to every statistical error of the result
    pub add_error: f64,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            propagate_systematic: false,
            add_error: 0.0,
        }
    }
}

/// Result of [`Table::linear_regression`]
///
/// Slope and intercept are in units of the `y` column per unit of the `x`
/// column and in units of the `y` column respectively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionResult {
    pub slope: f64,
    pub slope_error: f64,
    pub intercept: f64,
    pub intercept_error: f64,
}

impl Table {
    /// Bring an empty derived column up to date before reading it
    fn refresh_if_empty(&mut self, symbol: &Symbol) -> Result<()> {
        let column = self.column(symbol)?;
        if column.is_derived() && column.is_empty() {
            self.update(symbol, false)?;
        }
        Ok(())
    }

    fn plain_values(&mut self, key: impl ColumnKey, operation: &'static str) -> Result<&Column> {
        let symbol = self.symbol(&key)?;
        self.refresh_if_empty(&symbol)?;
        let column = self.column(&symbol)?;
        if column.has_attachments() {
            return Err(Error::AttachmentsNotSupported {
                column: column.name().to_string(),
                operation,
            });
        }
        Ok(column)
    }

    /// Add a column of differences between every `offset`-th value of `source`
    pub fn diff(
        &mut self,
        source: impl ColumnKey,
        target: impl Into<Symbol>,
        offset: usize,
    ) -> Result<&mut Column> {
        if offset == 0 {
            return Err(Error::InvalidArgument("diff offset must be at least 1".into()));
        }
        let column = self.plain_values(source, "diff")?;
        let values = diff_nth(&column.values(), offset, 0);
        let unit = column.unit().clone();

        tracing::debug!("diff {} -> {} rows", column.name(), values.len());
        self.add(Column::measurement_raw(target, unit, values))
    }

    /// Add a column of sums over runs of `count` values, after skipping `offset` rows
    pub fn integrate(
        &mut self,
        source: impl ColumnKey,
        target: impl Into<Symbol>,
        offset: usize,
        count: usize,
    ) -> Result<&mut Column> {
        if count == 0 {
            return Err(Error::InvalidArgument(
                "integrate count must be at least 1".into(),
            ));
        }
        let column = self.plain_values(source, "integrate")?;
        let values = int_nth(&column.values(), count, offset);
        let unit = column.unit().clone();

        tracing::debug!("integrate {} -> {} rows", column.name(), values.len());
        self.add(Column::measurement_raw(target, unit, values))
    }

    /// Add a column holding the row-wise mean of several columns
    ///
    /// Values are converted to the unit of the first source. The statistical
    /// error of each row is the standard error of the mean plus
    /// `options.add_error`.
    pub fn join<K: ColumnKey>(
        &mut self,
        target: impl Into<Symbol>,
        sources: &[K],
        options: &JoinOptions,
    ) -> Result<&mut Column> {
        let target = target.into();
        if sources.len() < 2 {
            return Err(Error::InvalidArgument(format!(
                "join needs at least 2 columns, got {}",
                sources.len()
            )));
        }
        let symbols = sources
            .iter()
            .map(|key| self.symbol(key))
            .collect::<Result<Vec<_>>>()?;
        for symbol in &symbols {
            self.refresh_if_empty(symbol)?;
        }
        let columns = symbols
            .iter()
            .map(|symbol| self.column(symbol))
            .collect::<Result<Vec<_>>>()?;

        let first = columns[0];
        let unit = first.unit().clone();
        let len = first.len();
        let mut factors = Vec::with_capacity(columns.len());
        for column in &columns {
            if column.len() != len {
                return Err(Error::RowCountMismatch {
                    column: column.name().to_string(),
                    expected: len,
                    found: column.len(),
                });
            }
            if !column.unit().dimension().is_compatible(&unit.dimension()) {
                return Err(Error::IncompatibleUnit {
                    column: column.name().to_string(),
                    expected: unit.dimension().to_string(),
                    found: column.unit().dimension().to_string(),
                });
            }
            factors.push(column.unit().scale() / unit.scale());
        }
        let systematic = options.propagate_systematic
            && columns
                .iter()
                .any(|c| c.attachment_kinds().contains(&UncertaintyKind::Systematic));
        if options.propagate_systematic && !systematic {
            tracing::warn!("join into {}: no source has systematic errors", target);
        }

        let mut iters: Vec<_> = columns.iter().map(|column| column.iter()).collect();
        let mut rows = Vec::with_capacity(len);
        for _ in 0..len {
            let mut values = Vec::with_capacity(iters.len());
            let mut systematic_errors = Vec::new();
            for (iter, factor) in iters.iter_mut().zip(&factors) {
                let Some((value, attachments)) = iter.next() else {
                    break;
                };
                values.push(value * factor);
                if let Some(error) = attachments.get(&UncertaintyKind::Systematic) {
                    systematic_errors.push(error * factor);
                }
            }

            let (mean, sem) = stats::mean(&values)?;
            let mut attachments = Attachments::new();
            attachments.insert(UncertaintyKind::Statistical, sem + options.add_error);
            if systematic && !systematic_errors.is_empty() {
                let average = systematic_errors.iter().sum::<f64>() / systematic_errors.len() as f64;
                attachments.insert(UncertaintyKind::Systematic, average);
            }
            rows.push((mean, attachments));
        }

        let mut joined = Column::measurement(target, unit);
        joined.new_attachment(UncertaintyKind::Statistical, Some(0.0))?;
        if systematic {
            joined.new_attachment(UncertaintyKind::Systematic, Some(0.0))?;
        }
        for (value, attachments) in &rows {
            joined.raw_append(*value, attachments)?;
        }

        tracing::debug!("join {} columns into {} ({} rows)", columns.len(), joined.name(), len);
        self.add(joined)
    }

    /// Least-squares fit `y = slope·x + intercept`
    ///
    /// Without `weights` the fit is unweighted and the standard errors come
    /// from the residual variance, which needs at least three points. With
    /// `Some(kind)` every point is weighted by `1/σ²`, where `σ` is the `kind`
    /// error of `y`, and the standard errors follow from those weights alone.
    pub fn linear_regression(
        &mut self,
        x: impl ColumnKey,
        y: impl ColumnKey,
        weights: Option<UncertaintyKind>,
    ) -> Result<RegressionResult> {
        let x = self.symbol(&x)?;
        let y = self.symbol(&y)?;
        self.refresh_if_empty(&x)?;
        self.refresh_if_empty(&y)?;
        let xs = self.column(&x)?.values();
        let ys = self.column(&y)?.values();

        if xs.len() != ys.len() {
            return Err(Error::RowCountMismatch {
                column: y.to_string(),
                expected: xs.len(),
                found: ys.len(),
            });
        }
        let n = xs.len();
        let needed = if weights.is_some() { 2 } else { 3 };
        if n < needed {
            return Err(Error::InsufficientData { needed, got: n });
        }

        let ws = match weights {
            None => vec![1.0; n],
            Some(kind) => {
                let column = self.column(&y)?;
                column
                    .iter()
                    .map(|(_, attachments)| match attachments.get(&kind) {
                        Some(sigma) if *sigma > 0.0 && sigma.is_finite() => {
                            Ok(1.0 / (sigma * sigma))
                        }
                        Some(sigma) => Err(Error::InvalidArgument(format!(
                            "{} error {} of column {} cannot weight a fit",
                            kind, sigma, y
                        ))),
                        None => Err(Error::InvalidArgument(format!(
                            "column {} has no {} errors to weight with",
                            y, kind
                        ))),
                    })
                    .collect::<Result<Vec<f64>>>()?
            }
        };

        let mut sw = 0.0;
        let mut swx = 0.0;
        let mut swy = 0.0;
        let mut swxx = 0.0;
        let mut swxy = 0.0;
        for ((x, y), w) in xs.iter().zip(&ys).zip(&ws) {
            sw += w;
            swx += w * x;
            swy += w * y;
            swxx += w * x * x;
            swxy += w * x * y;
        }
        let delta = sw * swxx - swx * swx;
        if delta <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "column {} has no spread, cannot fit a line",
                x
            )));
        }

        let slope = (sw * swxy - swx * swy) / delta;
        let intercept = (swxx * swy - swx * swxy) / delta;
        // σ² of the points: known from the weights, else estimated from residuals
        let scale = match weights {
            Some(_) => 1.0,
            None => {
                xs.iter()
                    .zip(&ys)
                    .map(|(x, y)| (y - slope * x - intercept).powi(2))
                    .sum::<f64>()
                    / (n as f64 - 2.0)
            }
        };

        Ok(RegressionResult {
            slope,
            slope_error: (scale * sw / delta).sqrt(),
            intercept,
            intercept_error: (scale * swxx / delta).sqrt(),
        })
    }
}
