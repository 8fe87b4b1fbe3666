//! Core of the tickerdash stock dashboard.
//!
//! This crate contains:
//! - Domain models with validation (symbols, periods, OHLCV bars)
//! - The provider contract and the Yahoo Finance chart adapter
//! - A TTL price cache and the fetcher built on it
//! - Analytics: moving averages, OHLCV correlation, linear-trend forecast
//! - Chart specifications, dashboard assembly and the refresh loop
//! - The JSON response envelope

pub mod adapters;
pub mod analytics;
pub mod cache;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod refresh;
pub mod source;

pub use adapters::YahooAdapter;
pub use analytics::{
    ema, sma, CorrelationMatrix, ForecastPoint, ForecastSeries, IndicatorSeries, LinearTrend,
};
pub use cache::{CacheKey, FetchResult, PriceCache};
pub use charts::{ChartSpec, LineDash, Trace};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardCharts, DashboardPanels, PriceAlert, PriceMetric};
pub use data_source::{DataSource, HistoryRequest, SourceError, SourceErrorKind};
pub use domain::{OhlcvField, Period, PriceBar, PriceSeries, Symbol, UtcDateTime};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{CoreError, DataUnavailable, UnavailableCause, ValidationError};
pub use fetcher::{DataFetcher, FetchOutcome, FetchStats};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use refresh::{RefreshLoop, RefreshSummary, StopHandle, StopReason};
pub use source::ProviderId;
