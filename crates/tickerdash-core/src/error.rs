use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation and contract errors exposed by `tickerdash-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid period '{value}', expected one of 1mo, 3mo, 6mo, 1y, 2y")]
    InvalidPeriod { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("unix timestamp {value} is out of range")]
    TimestampOutOfRange { value: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },
    #[error("alert price must be a finite, non-negative number, got {value}")]
    InvalidAlertPrice { value: f64 },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("source_chain must contain at least one source")]
    EmptySourceChain,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a fetch produced no price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableCause {
    UnknownSymbol,
    EmptyResult,
    Transport,
}

impl UnavailableCause {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownSymbol => "unknown_symbol",
            Self::EmptyResult => "empty_result",
            Self::Transport => "transport",
        }
    }
}

impl Display for UnavailableCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The one fetch-level failure: no data could be obtained for a symbol/period.
///
/// Every cause is handled identically downstream; only the message differs.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct DataUnavailable {
    cause: UnavailableCause,
    message: String,
}

impl DataUnavailable {
    pub fn unknown_symbol(symbol: impl Display) -> Self {
        Self {
            cause: UnavailableCause::UnknownSymbol,
            message: format!("No data found for {symbol}. Check the ticker symbol."),
        }
    }

    pub fn empty_result(symbol: impl Display, period: impl Display) -> Self {
        Self {
            cause: UnavailableCause::EmptyResult,
            message: format!("No price history returned for {symbol} over {period}."),
        }
    }

    pub fn transport(symbol: impl Display, detail: impl Display) -> Self {
        Self {
            cause: UnavailableCause::Transport,
            message: format!("Error fetching {symbol}: {detail}"),
        }
    }

    pub const fn cause(&self) -> UnavailableCause {
        self.cause
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        "data.unavailable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_cause_has_a_distinct_message() {
        let unknown = DataUnavailable::unknown_symbol("ZZZZ");
        let empty = DataUnavailable::empty_result("ZZZZ", "1mo");
        let transport = DataUnavailable::transport("ZZZZ", "connection reset");

        assert_eq!(unknown.cause(), UnavailableCause::UnknownSymbol);
        assert_eq!(
            unknown.message(),
            "No data found for ZZZZ. Check the ticker symbol."
        );
        assert!(empty.message().contains("1mo"));
        assert_eq!(transport.to_string(), "Error fetching ZZZZ: connection reset");
        assert_eq!(unknown.code(), transport.code());
    }
}
