//! Moving averages over closing prices.

use serde::{Deserialize, Serialize};

use crate::PriceSeries;

/// Trailing simple moving average.
///
/// Position `i` holds the mean of the last `min(i + 1, window)` values, so the
/// output has no leading gaps: the window grows until it reaches full size.
/// A zero window is treated as one.
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut running = 0.0;

    for (i, value) in values.iter().enumerate() {
        running += value;
        if i >= window {
            running -= values[i - window];
        }
        let count = (i + 1).min(window);
        out.push(running / count as f64);
    }

    out
}

/// Exponential moving average with `alpha = 2 / (span + 1)`.
///
/// Seeded with the first value rather than a warm-up mean, matching pandas
/// `ewm(span, adjust=False)`. A zero span is treated as one.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());

    for &value in values {
        let next = match out.last() {
            Some(&prev) => alpha * value + (1.0 - alpha) * prev,
            None => value,
        };
        out.push(next);
    }

    out
}

/// SMA and EMA overlays aligned 1:1 with a series' bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub sma_window: usize,
    pub ema_span: usize,
    pub sma: Vec<f64>,
    pub ema: Vec<f64>,
}

impl IndicatorSeries {
    pub fn compute(series: &PriceSeries, sma_window: usize, ema_span: usize) -> Self {
        let closes = series.closes();
        Self {
            sma_window,
            ema_span,
            sma: sma(&closes, sma_window),
            ema: ema(&closes, ema_span),
        }
    }

    pub fn sma_label(&self) -> String {
        format!("{}-Day SMA", self.sma_window)
    }

    pub fn ema_label(&self) -> String {
        format!("{}-Day EMA", self.ema_span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < 1e-10, "index {i}: {a} != {e}");
        }
    }

    #[test]
    fn sma_shrinks_window_at_series_start() {
        let result = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_close(&result, &[1.0, 1.5, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn sma_window_larger_than_series_is_expanding_mean() {
        let result = sma(&[2.0, 4.0, 6.0], 20);
        assert_close(&result, &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn sma_zero_window_is_identity() {
        assert_close(&sma(&[3.0, 7.0], 0), &[3.0, 7.0]);
    }

    #[test]
    fn ema_matches_adjust_false_recursion() {
        let result = ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_close(&result, &[1.0, 1.5, 2.25, 3.125, 4.0625]);
    }

    #[test]
    fn ema_of_constant_input_is_constant() {
        let result = ema(&[5.0; 20], 5);
        assert_close(&result, &[5.0; 20]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(sma(&[], 5).is_empty());
        assert!(ema(&[], 5).is_empty());
    }
}
