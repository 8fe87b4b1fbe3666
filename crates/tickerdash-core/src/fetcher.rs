//! Cached access to a [`DataSource`].

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, FetchResult, PriceCache};
use crate::data_source::{DataSource, HistoryRequest, SourceError, SourceErrorKind};
use crate::{DataUnavailable, Period, PriceSeries, ProviderId, Symbol};

/// What one call to [`DataFetcher::fetch`] produced.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub result: FetchResult,
    pub cache_hit: bool,
    pub latency_ms: u64,
    pub source: ProviderId,
}

impl FetchOutcome {
    pub fn series(&self) -> Option<&Arc<PriceSeries>> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&DataUnavailable> {
        self.result.as_ref().err()
    }

    pub fn stats(&self) -> FetchStats {
        FetchStats {
            cache_hit: self.cache_hit,
            latency_ms: self.latency_ms,
            source: self.source,
        }
    }
}

/// Bookkeeping for a fetch, without the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    pub cache_hit: bool,
    pub latency_ms: u64,
    pub source: ProviderId,
}

/// Fetches price history through a TTL cache.
///
/// Within the TTL every caller for the same `(symbol, period)` receives the
/// same `Arc<PriceSeries>`. On a miss, concurrent callers are serialized
/// behind a gate so exactly one of them reaches the provider.
pub struct DataFetcher {
    source: Arc<dyn DataSource>,
    cache: PriceCache,
    gate: tokio::sync::Mutex<()>,
}

impl DataFetcher {
    pub fn new(source: Arc<dyn DataSource>, cache: PriceCache) -> Self {
        Self {
            source,
            cache,
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    pub fn source_id(&self) -> ProviderId {
        self.source.id()
    }

    /// Returns a non-empty series or a [`DataUnavailable`] error, never both.
    pub async fn fetch(&self, symbol: &Symbol, period: Period) -> FetchOutcome {
        let started = Instant::now();
        let key = CacheKey::new(symbol.clone(), period);

        if let Some(result) = self.cache.get(&key).await {
            debug!(%symbol, %period, "price cache hit");
            return self.outcome(result, true, started);
        }

        let _guard = self.gate.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(result) = self.cache.get(&key).await {
            debug!(%symbol, %period, "price cache filled while waiting");
            return self.outcome(result, true, started);
        }

        info!(%symbol, %period, source = %self.source.id(), "fetching price history");
        let result = self
            .source
            .history(HistoryRequest::new(symbol.clone(), period))
            .await
            .map_err(|error| classify(symbol, error))
            .and_then(|series| {
                if series.is_empty() {
                    Err(DataUnavailable::empty_result(symbol, period))
                } else {
                    Ok(Arc::new(series))
                }
            });

        match &result {
            Ok(series) => info!(%symbol, %period, bars = series.len(), "price history loaded"),
            Err(error) => warn!(%symbol, %period, cause = %error.cause(), "{error}"),
        }

        self.cache.put(key, result.clone()).await;
        self.outcome(result, false, started)
    }

    fn outcome(&self, result: FetchResult, cache_hit: bool, started: Instant) -> FetchOutcome {
        FetchOutcome {
            result,
            cache_hit,
            latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            source: self.source.id(),
        }
    }
}

fn classify(symbol: &Symbol, error: SourceError) -> DataUnavailable {
    match error.kind() {
        SourceErrorKind::NotFound => DataUnavailable::unknown_symbol(symbol),
        SourceErrorKind::Unavailable | SourceErrorKind::Internal => {
            DataUnavailable::transport(symbol, error.message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UnavailableCause, YahooAdapter};
    use std::time::Duration;

    fn fetcher() -> DataFetcher {
        DataFetcher::new(
            Arc::new(YahooAdapter::default()),
            PriceCache::new(Duration::from_secs(60)),
        )
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let fetcher = fetcher();
        let symbol = Symbol::parse("AAPL").expect("valid");

        let first = fetcher.fetch(&symbol, Period::OneMonth).await;
        let second = fetcher.fetch(&symbol, Period::OneMonth).await;

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert!(Arc::ptr_eq(
            first.series().expect("series"),
            second.series().expect("series")
        ));
        assert_eq!(second.source, ProviderId::Synthetic);
    }

    #[tokio::test]
    async fn unknown_symbol_is_data_unavailable() {
        let fetcher = fetcher();
        let symbol = Symbol::parse("NOPE").expect("valid");

        let outcome = fetcher.fetch(&symbol, Period::OneYear).await;

        let error = outcome.error().expect("must fail");
        assert_eq!(error.cause(), UnavailableCause::UnknownSymbol);
        assert!(outcome.series().is_none());
    }

    #[test]
    fn internal_errors_are_reported_as_transport() {
        let symbol = Symbol::parse("AAPL").expect("valid");
        let error = classify(&symbol, SourceError::internal("bad json"));
        assert_eq!(error.cause(), UnavailableCause::Transport);
        assert_eq!(error.message(), "Error fetching AAPL: bad json");
    }
}
