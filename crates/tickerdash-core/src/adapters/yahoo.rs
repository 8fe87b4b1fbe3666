use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::{Date, Weekday};
use tracing::debug;

use crate::data_source::{DataSource, HistoryRequest, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient, ReqwestHttpClient};
use crate::{Period, PriceBar, PriceSeries, ProviderId, Symbol, UtcDateTime};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Symbols the offline generator knows about. Anything else is reported as
/// unknown, the same way the live chart endpoint answers 404.
const OFFLINE_CATALOG: [&str; 9] = [
    "AAPL", "MSFT", "TSLA", "GOOGL", "AMZN", "SPY", "QQQ", "^GSPC", "^IXIC",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Live,
    Offline,
}

/// Yahoo Finance daily-history adapter.
///
/// `YahooAdapter::default()` runs offline and serves deterministic synthetic
/// bars so tests and demos never touch the network.
/// [`YahooAdapter::live`] talks to the v8 chart endpoint.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    base_url: String,
    mode: Mode,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            auth: HttpAuth::None,
            base_url: String::from(DEFAULT_BASE_URL),
            mode: Mode::Offline,
        }
    }
}

impl YahooAdapter {
    /// Live adapter using reqwest and an optional `YAHOO_COOKIE` session.
    pub fn live() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), HttpAuth::from_env())
    }

    /// Live adapter over a caller-supplied transport.
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, auth: HttpAuth) -> Self {
        Self {
            http_client,
            auth,
            mode: Mode::Live,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn is_offline(&self) -> bool {
        self.mode == Mode::Offline
    }

    fn chart_url(&self, req: &HistoryRequest) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d&includePrePost=false",
            self.base_url,
            urlencoding::encode(req.symbol.as_str()),
            req.period.as_str(),
        )
    }
}

impl DataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        match self.mode {
            Mode::Live => ProviderId::Yahoo,
            Mode::Offline => ProviderId::Synthetic,
        }
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            match self.mode {
                Mode::Live => self.fetch_live_history(&req).await,
                Mode::Offline => synthetic_history(&req, UtcDateTime::now().date()),
            }
        })
    }
}

impl YahooAdapter {
    async fn fetch_live_history(&self, req: &HistoryRequest) -> Result<PriceSeries, SourceError> {
        let request = HttpRequest::get(self.chart_url(req))
            .with_header("referer", "https://finance.yahoo.com/")
            .with_auth(&self.auth)
            .with_timeout_ms(REQUEST_TIMEOUT_MS);

        debug!(url = %request.url, "requesting yahoo chart");
        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
        })?;

        if response.status == 404 {
            return Err(parse_chart_error(&response.body).unwrap_or_else(|| {
                SourceError::not_found(format!("yahoo has no chart for '{}'", req.symbol))
            }));
        }

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        parse_chart_response(&response.body, req)
    }
}

fn parse_chart_error(body: &str) -> Option<SourceError> {
    let chart: YahooChartResponse = serde_json::from_str(body).ok()?;
    chart.chart.error.map(YahooChartError::into_source_error)
}

fn parse_chart_response(body: &str, req: &HistoryRequest) -> Result<PriceSeries, SourceError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = chart_response.chart.error {
        return Err(error.into_source_error());
    }

    let empty = || PriceSeries::new(req.symbol.clone(), req.period, Vec::new());

    let Some(result) = chart_response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
    else {
        return Ok(empty());
    };

    let (Some(timestamps), Some(quote)) = (result.timestamp, result.indicators.quote.first())
    else {
        return Ok(empty());
    };

    // Daily bars are stamped at midnight UTC of the exchange's local date.
    let gmtoffset = result.meta.gmtoffset.unwrap_or(0);
    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts_value) in timestamps.iter().enumerate() {
        let local = UtcDateTime::from_unix_timestamp(ts_value.saturating_add(gmtoffset))
            .map_err(|e| SourceError::internal(format!("invalid timestamp: {e}")))?;
        let ts = UtcDateTime::from_date(local.date());

        // Halted or partial sessions come back with null OHLC values.
        if let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(i),
            quote.high.get(i),
            quote.low.get(i),
            quote.close.get(i),
        ) {
            let volume = quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .map_or(0, |v| v.max(0) as u64);

            match PriceBar::new(ts, *open, *high, *low, *close, volume) {
                Ok(bar) => bars.push(bar),
                Err(error) => debug!(%ts, %error, "skipping malformed yahoo bar"),
            }
        }
    }

    Ok(PriceSeries::new(req.symbol.clone(), req.period, bars))
}

/// Deterministic weekday-only history ending on the last weekday on or
/// before `today`.
fn synthetic_history(req: &HistoryRequest, today: Date) -> Result<PriceSeries, SourceError> {
    if !OFFLINE_CATALOG.contains(&req.symbol.as_str()) {
        return Err(SourceError::not_found(format!(
            "symbol '{}' is not in the offline catalog",
            req.symbol
        )));
    }

    let dates = trailing_weekdays(today, req.period.trading_days());
    let seed = symbol_seed(&req.symbol);
    let scale = if req.symbol.is_index() { 25.0 } else { 1.0 };
    let base = (60.0 + (seed % 400) as f64) * scale;
    let phase = (seed % 7) as f64;

    let bars = dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let step = i as f64;
            let close = base + scale * (0.12 * step + 3.0 * (step * 0.35 + phase).sin());
            let open = close - scale * 0.6 * (step * 0.9 + phase).cos();
            let high = open.max(close) + 0.9 * scale;
            let low = (open.min(close) - 0.9 * scale).max(0.01);
            let volume = 1_000_000 + seed % 400_000 + (i as u64 * 7_919) % 250_000;

            PriceBar::new(UtcDateTime::from_date(date), open, high, low, close, volume)
                .map_err(|e| SourceError::internal(format!("synthetic bar invalid: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PriceSeries::new(req.symbol.clone(), req.period, bars))
}

fn trailing_weekdays(today: Date, count: usize) -> Vec<Date> {
    let mut dates = Vec::with_capacity(count);
    let mut cursor = Some(today);
    while dates.len() < count {
        let Some(date) = cursor else { break };
        if !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
            dates.push(date);
        }
        cursor = date.previous_day();
    }
    dates.reverse();
    dates
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}

// Yahoo Finance chart response structures
#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl YahooChartError {
    fn into_source_error(self) -> SourceError {
        let detail = self.description.unwrap_or_else(|| self.code.clone());
        if self.code.eq_ignore_ascii_case("not found") {
            SourceError::not_found(format!("yahoo chart API: {detail}"))
        } else {
            SourceError::unavailable(format!("yahoo chart API error {}: {detail}", self.code))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: YahooChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpResponse};
    use std::sync::Mutex;

    const CHART_BODY: &str = r#"{"chart":{"result":[{"meta":{"symbol":"AAPL","gmtoffset":-18000},
        "timestamp":[1704205800,1704292200,1704378600],
        "indicators":{"quote":[{
            "open":[187.15,184.22,null],
            "high":[188.44,185.88,183.09],
            "low":[183.89,183.43,180.88],
            "close":[185.64,184.25,181.91],
            "volume":[82488700,null,62303300]}]}}],"error":null}}"#;

    const NOT_FOUND_BODY: &str = r#"{"chart":{"result":null,"error":{"code":"Not Found",
        "description":"No data found, symbol may be delisted"}}}"#;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn answering(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn request(symbol: &str, period: Period) -> HistoryRequest {
        HistoryRequest::new(Symbol::parse(symbol).expect("valid symbol"), period)
    }

    #[tokio::test]
    async fn live_history_builds_chart_url_and_parses_bars() {
        let client = RecordingHttpClient::answering(Ok(HttpResponse::ok_json(CHART_BODY)));
        let adapter = YahooAdapter::with_http_client(
            client.clone(),
            HttpAuth::Cookie(String::from("B=session")),
        );

        let series = adapter
            .history(request("AAPL", Period::ThreeMonths))
            .await
            .expect("chart should parse");

        // the bar with a null open is dropped, the null volume becomes zero
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![185.64, 184.25]);
        assert_eq!(series.volumes(), vec![82_488_700, 0]);
        assert_eq!(adapter.id(), ProviderId::Yahoo);

        let sent = client.recorded_requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].url.contains("/v8/finance/chart/AAPL?range=3mo&interval=1d"));
        assert_eq!(sent[0].headers.get("cookie").map(String::as_str), Some("B=session"));
        assert_eq!(sent[0].timeout_ms, REQUEST_TIMEOUT_MS);
    }

    #[test]
    fn bars_are_dated_in_exchange_time() {
        // 23:00 UTC is 10:00 the next morning in Sydney during daylight saving
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"BHP.AX","gmtoffset":39600},
            "timestamp":[1704150000,1704236400],
            "indicators":{"quote":[{
                "open":[45.1,45.6],"high":[45.9,46.0],"low":[44.8,45.2],
                "close":[45.5,45.8],"volume":[5000000,4800000]}]}}],"error":null}}"#;

        let series =
            parse_chart_response(body, &request("BHP.AX", Period::OneMonth)).expect("chart");

        let dates: Vec<String> = series
            .timestamps()
            .iter()
            .map(|ts| ts.date().to_string())
            .collect();
        assert_eq!(dates, ["2024-01-02", "2024-01-03"]);
        assert_eq!(series.timestamps()[0].format_rfc3339(), "2024-01-02T00:00:00Z");
    }

    #[test]
    fn western_exchange_keeps_the_session_date() {
        let series = parse_chart_response(CHART_BODY, &request("AAPL", Period::OneMonth))
            .expect("chart");

        // first kept bar is the 09:30 New York open on 2024-01-03 (14:30 UTC)
        let first = series.first().expect("bar");
        assert_eq!(first.ts.format_rfc3339(), "2024-01-03T00:00:00Z");
    }

    #[tokio::test]
    async fn index_symbols_are_url_encoded() {
        let client = RecordingHttpClient::answering(Ok(HttpResponse::ok_json(CHART_BODY)));
        let adapter = YahooAdapter::with_http_client(client.clone(), HttpAuth::None)
            .with_base_url("http://localhost:9999/");

        adapter
            .history(request("^GSPC", Period::OneMonth))
            .await
            .expect("chart should parse");

        let sent = client.recorded_requests();
        assert!(sent[0]
            .url
            .starts_with("http://localhost:9999/v8/finance/chart/%5EGSPC?"));
    }

    #[tokio::test]
    async fn unknown_symbol_maps_to_not_found() {
        let client = RecordingHttpClient::answering(Ok(HttpResponse::new(404, NOT_FOUND_BODY)));
        let adapter = YahooAdapter::with_http_client(client, HttpAuth::None);

        let error = adapter
            .history(request("ZZZZZZ", Period::OneMonth))
            .await
            .expect_err("404 must fail");

        assert_eq!(error.kind(), SourceErrorKind::NotFound);
        assert!(error.message().contains("symbol may be delisted"));
    }

    #[tokio::test]
    async fn transport_failure_maps_to_unavailable() {
        let client = RecordingHttpClient::answering(Err(HttpError::new("upstream timeout")));
        let adapter = YahooAdapter::with_http_client(client, HttpAuth::None);

        let error = adapter
            .history(request("AAPL", Period::OneMonth))
            .await
            .expect_err("transport failure must fail");

        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert!(error.message().contains("upstream timeout"));
    }

    #[tokio::test]
    async fn server_error_maps_to_unavailable() {
        let client = RecordingHttpClient::answering(Ok(HttpResponse::new(503, "busy")));
        let adapter = YahooAdapter::with_http_client(client, HttpAuth::None);

        let error = adapter
            .history(request("AAPL", Period::OneMonth))
            .await
            .expect_err("503 must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn undecodable_payload_maps_to_internal() {
        let adapter = YahooAdapter::with_http_client(Arc::new(NoopHttpClient), HttpAuth::None);

        let error = adapter
            .history(request("AAPL", Period::OneMonth))
            .await
            .expect_err("empty object is not a chart");
        assert_eq!(error.kind(), SourceErrorKind::Internal);
    }

    #[tokio::test]
    async fn chart_without_timestamps_is_an_empty_series() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let client = RecordingHttpClient::answering(Ok(HttpResponse::ok_json(body)));
        let adapter = YahooAdapter::with_http_client(client, HttpAuth::None);

        let series = adapter
            .history(request("NEWIPO", Period::OneMonth))
            .await
            .expect("empty chart is not an error");
        assert!(series.is_empty());
    }

    #[test]
    fn synthetic_history_matches_trading_day_count() {
        let today = Date::from_calendar_date(2024, time::Month::March, 10).expect("date");

        for period in Period::ALL {
            let series =
                synthetic_history(&request("MSFT", period), today).expect("catalog symbol");
            assert_eq!(series.len(), period.trading_days());

            let last = series.last().expect("non-empty");
            // 2024-03-10 is a Sunday
            assert_eq!(last.ts.date(), today.previous_day().and_then(Date::previous_day).expect("date"));
            assert!(series
                .bars()
                .iter()
                .all(|bar| !matches!(bar.ts.date().weekday(), Weekday::Saturday | Weekday::Sunday)));
        }
    }

    #[test]
    fn synthetic_history_is_deterministic() {
        let today = Date::from_calendar_date(2024, time::Month::March, 8).expect("date");
        let first = synthetic_history(&request("^IXIC", Period::SixMonths), today).expect("ok");
        let second = synthetic_history(&request("^IXIC", Period::SixMonths), today).expect("ok");
        assert_eq!(first, second);
    }

    #[test]
    fn synthetic_history_rejects_unknown_symbols() {
        let today = Date::from_calendar_date(2024, time::Month::March, 8).expect("date");
        let error = synthetic_history(&request("ZZZZ", Period::OneMonth), today)
            .expect_err("not in catalog");
        assert_eq!(error.kind(), SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn default_adapter_is_offline() {
        let adapter = YahooAdapter::default();
        assert!(adapter.is_offline());
        assert_eq!(adapter.id(), ProviderId::Synthetic);

        let series = adapter
            .history(request("AAPL", Period::OneMonth))
            .await
            .expect("offline catalog symbol");
        assert_eq!(series.len(), Period::OneMonth.trading_days());
    }
}
