//! Validated dashboard settings.

use std::time::Duration;

use serde::Serialize;

use crate::{DataUnavailable, Period, Symbol, ValidationError};

/// Everything one render cycle needs to know about the user's choices.
///
/// Only reachable through the validating setters, so a held value always
/// satisfies the range constants below. The symbol is kept as typed and
/// resolved on every cycle; a malformed one is a data-unavailable cycle,
/// not a configuration error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardConfig {
    symbol: String,
    period: Period,
    sma_window: usize,
    ema_span: usize,
    forecast_days: usize,
    alert_price: f64,
    #[serde(rename = "refresh_interval_secs", serialize_with = "as_secs")]
    refresh_interval: Duration,
}

impl DashboardConfig {
    pub const SMA_WINDOW_RANGE: (u64, u64) = (5, 50);
    pub const EMA_SPAN_RANGE: (u64, u64) = (5, 50);
    pub const FORECAST_DAYS_RANGE: (u64, u64) = (5, 30);
    pub const REFRESH_SECS_RANGE: (u64, u64) = (5, 60);

    pub const DEFAULT_SMA_WINDOW: usize = 20;
    pub const DEFAULT_EMA_SPAN: usize = 20;
    pub const DEFAULT_FORECAST_DAYS: usize = 10;
    pub const DEFAULT_REFRESH_SECS: u64 = 10;

    /// Defaults for everything except the symbol and period.
    pub fn new(symbol: impl Into<String>, period: Period) -> Self {
        Self {
            symbol: symbol.into().trim().to_ascii_uppercase(),
            period,
            sma_window: Self::DEFAULT_SMA_WINDOW,
            ema_span: Self::DEFAULT_EMA_SPAN,
            forecast_days: Self::DEFAULT_FORECAST_DAYS,
            alert_price: 0.0,
            refresh_interval: Duration::from_secs(Self::DEFAULT_REFRESH_SECS),
        }
    }

    pub fn with_sma_window(mut self, window: usize) -> Result<Self, ValidationError> {
        self.sma_window = check_range("sma_window", window, Self::SMA_WINDOW_RANGE)?;
        Ok(self)
    }

    pub fn with_ema_span(mut self, span: usize) -> Result<Self, ValidationError> {
        self.ema_span = check_range("ema_span", span, Self::EMA_SPAN_RANGE)?;
        Ok(self)
    }

    pub fn with_forecast_days(mut self, days: usize) -> Result<Self, ValidationError> {
        self.forecast_days = check_range("forecast_days", days, Self::FORECAST_DAYS_RANGE)?;
        Ok(self)
    }

    /// `0.0` disables the alert.
    pub fn with_alert_price(mut self, price: f64) -> Result<Self, ValidationError> {
        if !price.is_finite() || price < 0.0 {
            return Err(ValidationError::InvalidAlertPrice { value: price });
        }
        self.alert_price = price;
        Ok(self)
    }

    pub fn with_refresh_secs(mut self, secs: u64) -> Result<Self, ValidationError> {
        let (min, max) = Self::REFRESH_SECS_RANGE;
        if !(min..=max).contains(&secs) {
            return Err(ValidationError::OutOfRange {
                field: "refresh_interval",
                min,
                max,
                value: secs,
            });
        }
        self.refresh_interval = Duration::from_secs(secs);
        Ok(self)
    }

    /// The ticker as entered, trimmed and uppercased.
    pub fn symbol_input(&self) -> &str {
        &self.symbol
    }

    pub fn symbol(&self) -> Result<Symbol, DataUnavailable> {
        Symbol::parse(&self.symbol).map_err(|_| {
            if self.symbol.is_empty() {
                DataUnavailable::unknown_symbol("''")
            } else {
                DataUnavailable::unknown_symbol(&self.symbol)
            }
        })
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn sma_window(&self) -> usize {
        self.sma_window
    }

    pub fn ema_span(&self) -> usize {
        self.ema_span
    }

    pub fn forecast_days(&self) -> usize {
        self.forecast_days
    }

    pub fn alert_price(&self) -> f64 {
        self.alert_price
    }

    /// `None` when the alert is disabled.
    pub fn alert_threshold(&self) -> Option<f64> {
        (self.alert_price > 0.0).then_some(self.alert_price)
    }

    /// Refresh cadence; also the cache TTL.
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new(Symbol::default(), Period::default())
    }
}

fn check_range(
    field: &'static str,
    value: usize,
    (min, max): (u64, u64),
) -> Result<usize, ValidationError> {
    let wide = value as u64;
    if (min..=max).contains(&wide) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value: wide,
        })
    }
}

fn as_secs<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnavailableCause;

    #[test]
    fn defaults_match_sidebar_defaults() {
        let config = DashboardConfig::default();

        assert_eq!(config.symbol_input(), "AAPL");
        assert_eq!(config.symbol().expect("valid").as_str(), "AAPL");
        assert_eq!(config.period(), Period::OneMonth);
        assert_eq!(config.sma_window(), 20);
        assert_eq!(config.ema_span(), 20);
        assert_eq!(config.forecast_days(), 10);
        assert_eq!(config.alert_threshold(), None);
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let config = DashboardConfig::default()
            .with_sma_window(5)
            .and_then(|c| c.with_ema_span(50))
            .and_then(|c| c.with_forecast_days(30))
            .and_then(|c| c.with_refresh_secs(60))
            .expect("bounds are valid");

        assert_eq!(config.sma_window(), 5);
        assert_eq!(config.ema_span(), 50);
    }

    #[test]
    fn rejects_out_of_range_window() {
        let err = DashboardConfig::default()
            .with_sma_window(4)
            .expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "sma_window",
                min: 5,
                max: 50,
                value: 4
            }
        );
    }

    #[test]
    fn rejects_refresh_outside_bounds() {
        assert!(DashboardConfig::default().with_refresh_secs(4).is_err());
        assert!(DashboardConfig::default().with_refresh_secs(61).is_err());
    }

    #[test]
    fn malformed_symbol_resolves_to_unknown_symbol() {
        let empty = DashboardConfig::new("  ", Period::OneMonth);
        let err = empty.symbol().expect_err("empty symbol");
        assert_eq!(err.cause(), UnavailableCause::UnknownSymbol);
        assert_eq!(err.message(), "No data found for ''. Check the ticker symbol.");

        let bad = DashboardConfig::new("a$b", Period::OneMonth);
        assert_eq!(bad.symbol_input(), "A$B");
        assert_eq!(
            bad.symbol().expect_err("bad symbol").message(),
            "No data found for A$B. Check the ticker symbol."
        );
    }

    #[test]
    fn rejects_negative_or_nan_alert() {
        assert!(DashboardConfig::default().with_alert_price(-1.0).is_err());
        assert!(DashboardConfig::default().with_alert_price(f64::NAN).is_err());
        let config = DashboardConfig::default()
            .with_alert_price(150.5)
            .expect("valid");
        assert_eq!(config.alert_threshold(), Some(150.5));
    }
}
