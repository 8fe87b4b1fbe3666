//! Provider contract and request/response types.
//!
//! [`DataSource`] is the single seam between tickerdash and a market-data
//! provider: given a symbol and a [`Period`], return the daily OHLCV history.
//!
//! ```rust,ignore
//! use tickerdash_core::{DataSource, HistoryRequest, Period, Symbol, YahooAdapter};
//!
//! async fn closes(adapter: &YahooAdapter) -> Result<Vec<f64>, SourceError> {
//!     let request = HistoryRequest::new(Symbol::parse("AAPL")?, Period::OneMonth);
//!     let series = adapter.history(request).await?;
//!     Ok(series.closes())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{Period, PriceSeries, ProviderId, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The provider does not know the symbol.
    NotFound,
    /// Transport failure or non-success upstream status.
    Unavailable,
    /// Upstream payload could not be decoded.
    Internal,
}

/// Structured adapter error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for the daily history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub period: Period,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, period: Period) -> Self {
        Self { symbol, period }
    }
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the fetcher shares one instance
/// behind an `Arc` for the life of the process.
pub trait DataSource: Send + Sync {
    /// Returns the provider identifier reported in envelope metadata.
    fn id(&self) -> ProviderId;

    /// Fetches daily OHLCV history for the requested window.
    ///
    /// An `Ok` series may be empty; callers decide whether that is an error.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if:
    /// - The symbol is unknown to the provider ([`SourceErrorKind::NotFound`])
    /// - The transport fails or the provider answers with a non-success status
    /// - The payload cannot be decoded
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>>;
}
