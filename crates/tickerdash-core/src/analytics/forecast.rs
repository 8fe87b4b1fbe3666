//! Linear-trend price projection.
//!
//! The predictor is the whole number of calendar days between each bar and
//! the first bar; the response is the close. Projections continue on
//! consecutive calendar days after the last bar, weekends included, even
//! though the history itself only holds trading days.

use serde::{Deserialize, Serialize};

use crate::{PriceSeries, UtcDateTime};

/// Ordinary least-squares line `price = intercept + slope * day_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Fits `ys` against `xs`. With fewer than two points, or when every `x`
    /// is the same, the fit is the flat line through the mean of `ys`.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Self {
        let n = xs.len().min(ys.len());
        if n == 0 {
            return Self {
                slope: 0.0,
                intercept: 0.0,
            };
        }

        let len = n as f64;
        let mean_x = xs[..n].iter().sum::<f64>() / len;
        let mean_y = ys[..n].iter().sum::<f64>() / len;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (x, y) in xs[..n].iter().zip(&ys[..n]) {
            sxy += (x - mean_x) * (y - mean_y);
            sxx += (x - mean_x) * (x - mean_x);
        }

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Self {
            slope,
            intercept: mean_y - slope * mean_x,
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ts: UtcDateTime,
    pub day_offset: i64,
    pub forecasted_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub trend: LinearTrend,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    /// Projects `days` calendar days past the last bar of `series`.
    ///
    /// An empty series yields an empty forecast.
    pub fn project(series: &PriceSeries, days: usize) -> Self {
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Self {
                trend: LinearTrend::fit(&[], &[]),
                points: Vec::new(),
            };
        };

        let offsets: Vec<f64> = series
            .bars()
            .iter()
            .map(|bar| bar.ts.calendar_days_since(first.ts) as f64)
            .collect();
        let trend = LinearTrend::fit(&offsets, &series.closes());

        let last_offset = last.ts.calendar_days_since(first.ts);
        let points = (1..=days as i64)
            .map(|step| {
                let day_offset = last_offset + step;
                ForecastPoint {
                    ts: last.ts.plus_days(step),
                    day_offset,
                    forecasted_price: trend.predict(day_offset as f64),
                }
            })
            .collect();

        Self { trend, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
