//! Pairwise Pearson correlation over the OHLCV columns.

use serde::Serialize;

use crate::{OhlcvField, PriceSeries};

/// Symmetric 5x5 correlation table indexed by [`OhlcvField`] on both axes.
///
/// Entries are `NaN` when fewer than two observations exist or either column
/// has zero variance; `NaN` serializes as JSON `null`. Any other diagonal
/// entry is exactly `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: [OhlcvField; 5],
    pub values: [[f64; 5]; 5],
}

impl CorrelationMatrix {
    pub fn compute(series: &PriceSeries) -> Self {
        let columns: Vec<Vec<f64>> = OhlcvField::ALL
            .iter()
            .map(|field| series.column(*field))
            .collect();

        let mut values = [[f64::NAN; 5]; 5];
        for i in 0..5 {
            for j in i..5 {
                let mut r = pearson(&columns[i], &columns[j]);
                if i == j && !r.is_nan() {
                    r = 1.0;
                }
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self {
            columns: OhlcvField::ALL,
            values,
        }
    }

    pub fn get(&self, row: OhlcvField, column: OhlcvField) -> f64 {
        self.values[row.index()][column.index()]
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.columns.iter().map(|field| field.as_str()).collect()
    }
}

/// Pearson correlation coefficient of two equally long samples.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }

    let len = n as f64;
    let mean_x = xs[..n].iter().sum::<f64>() / len;
    let mean_y = ys[..n].iter().sum::<f64>() / len;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }

    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}
