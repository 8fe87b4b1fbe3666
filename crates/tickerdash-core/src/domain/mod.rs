//! # Domain Models
//!
//! Canonical domain types for tickerdash market data.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker symbol (equities and `^` indices) |
//! | [`Period`] | Lookback window token (1mo, 3mo, 6mo, 1y, 2y) |
//! | [`PriceBar`] | Daily OHLCV record |
//! | [`PriceSeries`] | Date-ordered bars for a symbol/period |
//! | [`OhlcvField`] | Column selector over a series |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! All types enforce their invariants at construction time:
//!
//! ```rust,ignore
//! use tickerdash_core::{PriceBar, UtcDateTime, ValidationError};
//!
//! let ts = UtcDateTime::parse("2024-01-02T14:30:00Z")?;
//! let bar = PriceBar::new(ts, 100.0, 105.0, 95.0, 102.0, 1_000)?;
//!
//! // high < low
//! let invalid = PriceBar::new(ts, 100.0, 95.0, 105.0, 102.0, 1_000);
//! assert!(matches!(invalid, Err(ValidationError::InvalidBarRange)));
//! ```

mod models;
mod period;
mod symbol;
mod timestamp;

pub use models::{OhlcvField, PriceBar, PriceSeries};
pub use period::Period;
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
