//! Derived series computed from a loaded [`PriceSeries`](crate::PriceSeries).
//!
//! Everything here is a pure function of its inputs and is recomputed in
//! full on every render cycle.

pub mod correlation;
pub mod forecast;
pub mod indicators;

pub use correlation::CorrelationMatrix;
pub use forecast::{ForecastPoint, ForecastSeries, LinearTrend};
pub use indicators::{ema, sma, IndicatorSeries};
