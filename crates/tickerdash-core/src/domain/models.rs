use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Period, Symbol, UtcDateTime, ValidationError};

/// One daily OHLCV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Value of one OHLCV column, volume widened to `f64`.
    pub fn field(&self, field: OhlcvField) -> f64 {
        match field {
            OhlcvField::Open => self.open,
            OhlcvField::High => self.high,
            OhlcvField::Low => self.low,
            OhlcvField::Close => self.close,
            OhlcvField::Volume => self.volume as f64,
        }
    }
}

/// The five numeric columns of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OhlcvField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl OhlcvField {
    pub const ALL: [Self; 5] = [Self::Open, Self::High, Self::Low, Self::Close, Self::Volume];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Open => 0,
            Self::High => 1,
            Self::Low => 2,
            Self::Close => 3,
            Self::Volume => 4,
        }
    }
}

impl Display for OhlcvField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date-ordered daily history for one symbol and period.
///
/// Bar timestamps are strictly increasing. Gaps (weekends, holidays, halts)
/// are whatever the provider returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub period: Period,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series, sorting by timestamp and keeping the last bar of any
    /// duplicated timestamp.
    pub fn new(symbol: Symbol, period: Period, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.ts);
        let mut ordered: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            if let Some(last) = ordered.last_mut() {
                if last.ts == bar.ts {
                    *last = bar;
                    continue;
                }
            }
            ordered.push(bar);
        }

        Self {
            symbol,
            period,
            bars: ordered,
        }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn column(&self, field: OhlcvField) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.field(field)).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.column(OhlcvField::Open)
    }

    pub fn highs(&self) -> Vec<f64> {
        self.column(OhlcvField::High)
    }

    pub fn lows(&self) -> Vec<f64> {
        self.column(OhlcvField::Low)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.column(OhlcvField::Close)
    }

    pub fn volumes(&self) -> Vec<u64> {
        self.bars.iter().map(|bar| bar.volume).collect()
    }

    pub fn timestamps(&self) -> Vec<UtcDateTime> {
        self.bars.iter().map(|bar| bar.ts).collect()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.last().map(|bar| bar.close)
    }

    pub fn previous_close(&self) -> Option<f64> {
        self.bars
            .len()
            .checked_sub(2)
            .and_then(|index| self.bars.get(index))
            .map(|bar| bar.close)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
