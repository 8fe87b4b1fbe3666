//! One render cycle: fetch, analyse, lay out.

use serde::Serialize;
use tracing::{debug, warn};

use crate::analytics::{CorrelationMatrix, ForecastSeries, IndicatorSeries};
use crate::charts::{self, ChartSpec};
use crate::config::DashboardConfig;
use crate::fetcher::{DataFetcher, FetchStats};
use crate::{DataUnavailable, Period, PriceSeries, Symbol, UtcDateTime};

/// S&P 500 index ticker used for the market comparison.
pub const SP500_SYMBOL: &str = "^GSPC";
/// NASDAQ Composite index ticker used for the market comparison.
pub const NASDAQ_SYMBOL: &str = "^IXIC";

/// Latest close with its move from the previous bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceMetric {
    pub label: String,
    pub last_price: f64,
    pub change: Option<f64>,
    pub pct_change: Option<f64>,
}

impl PriceMetric {
    /// `None` only for an empty series. A single bar has no change.
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let last_price = series.last_close()?;
        let change = series.previous_close().map(|prev| last_price - prev);
        let pct_change = series
            .previous_close()
            .zip(change)
            .filter(|(prev, _)| *prev != 0.0)
            .map(|(prev, change)| change / prev * 100.0);

        Some(Self {
            label: format!("{} Price", series.symbol),
            last_price,
            change,
            pct_change,
        })
    }

    pub fn value_text(&self) -> String {
        format!("${:.2}", self.last_price)
    }

    /// e.g. `1.25 (0.84%)`.
    pub fn delta_text(&self) -> Option<String> {
        let change = self.change?;
        Some(match self.pct_change {
            Some(pct) => format!("{change:.2} ({pct:.2}%)"),
            None => format!("{change:.2}"),
        })
    }
}

/// Raised whenever the last close is at or above the threshold.
///
/// The threshold prints with its decimal point, so `200` shows as `$200.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAlert {
    pub threshold: f64,
    pub last_price: f64,
    pub message: String,
}

impl PriceAlert {
    pub fn evaluate(symbol: &Symbol, last_price: f64, threshold: Option<f64>) -> Option<Self> {
        let threshold = threshold.filter(|level| *level > 0.0)?;
        (last_price >= threshold).then(|| Self {
            threshold,
            last_price,
            message: format!("ALERT: {symbol} has crossed ${threshold:?}!"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub price: ChartSpec,
    pub correlation: ChartSpec,
    pub volume: ChartSpec,
    pub forecast: ChartSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ChartSpec>,
}

/// Everything derived from a successfully fetched series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPanels {
    pub bars: usize,
    pub metric: PriceMetric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<PriceAlert>,
    pub indicators: IndicatorSeries,
    pub correlation: CorrelationMatrix,
    pub forecast: ForecastSeries,
    pub charts: DashboardCharts,
}

impl DashboardPanels {
    /// Runs every analysis over `series`. Returns `None` for an empty series.
    pub fn compute(config: &DashboardConfig, series: &PriceSeries) -> Option<Self> {
        let metric = PriceMetric::from_series(series)?;
        let alert = PriceAlert::evaluate(&series.symbol, metric.last_price, config.alert_threshold());
        let indicators = IndicatorSeries::compute(series, config.sma_window(), config.ema_span());
        let correlation = CorrelationMatrix::compute(series);
        let forecast = ForecastSeries::project(series, config.forecast_days());

        let charts = DashboardCharts {
            price: charts::price_chart(series, &indicators),
            correlation: charts::correlation_chart(series, &correlation),
            volume: charts::volume_chart(series),
            forecast: charts::forecast_chart(series, &forecast),
            comparison: None,
        };

        Some(Self {
            bars: series.len(),
            metric,
            alert,
            indicators,
            correlation,
            forecast,
            charts,
        })
    }
}

/// Result of one render cycle.
///
/// Exactly one of `error` and `panels` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub symbol: String,
    pub period: Period,
    pub generated_at: UtcDateTime,
    pub fetch: FetchStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DataUnavailable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panels: Option<DashboardPanels>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Dashboard {
    pub async fn build(config: &DashboardConfig, fetcher: &DataFetcher) -> Self {
        let period = config.period();
        let symbol = match config.symbol() {
            Ok(symbol) => symbol,
            Err(error) => {
                warn!(symbol = config.symbol_input(), "{error}");
                let fetch = FetchStats {
                    cache_hit: false,
                    latency_ms: 0,
                    source: fetcher.source_id(),
                };
                return Self::unavailable(config.symbol_input(), period, fetch, error);
            }
        };
        let outcome = fetcher.fetch(&symbol, period).await;
        let fetch = outcome.stats();

        let series = match outcome.result {
            Ok(series) => series,
            // Nothing downstream runs without data.
            Err(error) => return Self::unavailable(symbol.as_str(), period, fetch, error),
        };

        let mut warnings = Vec::new();
        let mut panels = DashboardPanels::compute(config, &series);
        if let Some(panels) = panels.as_mut() {
            match benchmark_comparison(fetcher, &series).await {
                Ok(chart) => panels.charts.comparison = Some(chart),
                Err(error) => {
                    warn!(%symbol, "market comparison skipped: {error}");
                    warnings.push(format!("Market comparison unavailable: {error}"));
                }
            }
            if let Some(alert) = &panels.alert {
                debug!(%symbol, threshold = alert.threshold, "price alert raised");
            }
        }

        Self {
            symbol: symbol.into(),
            period,
            generated_at: UtcDateTime::now(),
            fetch,
            error: None,
            panels,
            warnings,
        }
    }

    fn unavailable(
        symbol: &str,
        period: Period,
        fetch: FetchStats,
        error: DataUnavailable,
    ) -> Self {
        Self {
            symbol: symbol.to_owned(),
            period,
            generated_at: UtcDateTime::now(),
            fetch,
            error: Some(error),
            panels: None,
            warnings: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.panels.is_some()
    }

    pub fn metric(&self) -> Option<&PriceMetric> {
        self.panels.as_ref().map(|panels| &panels.metric)
    }

    pub fn alert(&self) -> Option<&PriceAlert> {
        self.panels.as_ref().and_then(|panels| panels.alert.as_ref())
    }
}

async fn benchmark_comparison(
    fetcher: &DataFetcher,
    stock: &PriceSeries,
) -> Result<ChartSpec, DataUnavailable> {
    let mut benchmarks = Vec::with_capacity(2);
    for ticker in [SP500_SYMBOL, NASDAQ_SYMBOL] {
        let symbol = Symbol::parse(ticker)
            .map_err(|error| DataUnavailable::transport(ticker, error))?;
        let outcome = fetcher.fetch(&symbol, stock.period).await;
        benchmarks.push(outcome.result?);
    }

    match benchmarks.as_slice() {
        [sp500, nasdaq] => Ok(charts::comparison_chart(stock, sp500, nasdaq)),
        _ => Err(DataUnavailable::empty_result("benchmarks", stock.period)),
    }
}
