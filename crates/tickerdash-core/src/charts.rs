//! Declarative chart specifications.
//!
//! A [`ChartSpec`] describes one figure: layout titles, a theme template and
//! an ordered list of traces. Specs serialize to JSON shaped closely enough
//! to plotly figures that a front end can hand them over with little
//! translation. Nothing here draws.

use serde::Serialize;

use crate::analytics::{CorrelationMatrix, ForecastSeries, IndicatorSeries};
use crate::{OhlcvField, PriceSeries, UtcDateTime};

/// Dark theme used by every dashboard figure.
pub const DARK_TEMPLATE: &str = "plotly_dark";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_title: Option<String>,
    pub template: String,
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_axis_title: None,
            y_axis_title: None,
            template: String::from(DARK_TEMPLATE),
            traces: Vec::new(),
        }
    }

    pub fn with_axes(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_axis_title = Some(x.into());
        self.y_axis_title = Some(y.into());
        self
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|trace| trace.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Dot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick {
        name: String,
        x: Vec<UtcDateTime>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    Line {
        name: String,
        x: Vec<UtcDateTime>,
        y: Vec<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        dash: Option<LineDash>,
    },
    Bar {
        name: String,
        x: Vec<UtcDateTime>,
        y: Vec<f64>,
    },
    Heatmap {
        name: String,
        x: Vec<String>,
        y: Vec<String>,
        z: Vec<Vec<f64>>,
        colorscale: String,
        annotated: bool,
    },
}

impl Trace {
    pub fn line(name: impl Into<String>, x: Vec<UtcDateTime>, y: Vec<f64>) -> Self {
        Self::Line {
            name: name.into(),
            x,
            y,
            dash: None,
        }
    }

    pub fn dotted_line(name: impl Into<String>, x: Vec<UtcDateTime>, y: Vec<f64>) -> Self {
        Self::Line {
            name: name.into(),
            x,
            y,
            dash: Some(LineDash::Dot),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Candlestick { name, .. }
            | Self::Line { name, .. }
            | Self::Bar { name, .. }
            | Self::Heatmap { name, .. } => name,
        }
    }

    /// Number of plotted points along the x axis.
    pub fn len(&self) -> usize {
        match self {
            Self::Candlestick { x, .. } | Self::Line { x, .. } | Self::Bar { x, .. } => x.len(),
            Self::Heatmap { x, .. } => x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Candlestick with SMA and EMA overlays.
pub fn price_chart(series: &PriceSeries, indicators: &IndicatorSeries) -> ChartSpec {
    let dates = series.timestamps();
    ChartSpec::new(format!("{} Stock Analysis", series.symbol))
        .with_axes("Date", "Price")
        .with_trace(Trace::Candlestick {
            name: String::from("Candlestick"),
            x: dates.clone(),
            open: series.opens(),
            high: series.highs(),
            low: series.lows(),
            close: series.closes(),
        })
        .with_trace(Trace::line(
            indicators.sma_label(),
            dates.clone(),
            indicators.sma.clone(),
        ))
        .with_trace(Trace::line(
            indicators.ema_label(),
            dates,
            indicators.ema.clone(),
        ))
}

/// Annotated heatmap on a diverging colour scale.
pub fn correlation_chart(series: &PriceSeries, matrix: &CorrelationMatrix) -> ChartSpec {
    let labels: Vec<String> = matrix.labels().into_iter().map(String::from).collect();
    ChartSpec::new(format!("{} Correlation Matrix", series.symbol)).with_trace(Trace::Heatmap {
        name: String::from("Correlation"),
        x: labels.clone(),
        y: labels,
        z: matrix.values.iter().map(|row| row.to_vec()).collect(),
        colorscale: String::from("RdBu"),
        annotated: true,
    })
}

pub fn volume_chart(series: &PriceSeries) -> ChartSpec {
    ChartSpec::new(format!("{} Trading Volume", series.symbol))
        .with_axes("Date", "Volume")
        .with_trace(Trace::Bar {
            name: String::from("Volume"),
            x: series.timestamps(),
            y: series.column(OhlcvField::Volume),
        })
}

/// Historical closes followed by the dotted projection.
pub fn forecast_chart(series: &PriceSeries, forecast: &ForecastSeries) -> ChartSpec {
    ChartSpec::new(format!(
        "{} Forecast for Next {} Days",
        series.symbol,
        forecast.len()
    ))
    .with_axes("Date", "Price")
    .with_trace(Trace::line(
        "Historical Prices",
        series.timestamps(),
        series.closes(),
    ))
    .with_trace(Trace::dotted_line(
        "Forecasted Prices",
        forecast.points.iter().map(|point| point.ts).collect(),
        forecast
            .points
            .iter()
            .map(|point| point.forecasted_price)
            .collect(),
    ))
}

/// Close series of the stock against both benchmarks, each on its own dates.
pub fn comparison_chart(
    stock: &PriceSeries,
    sp500: &PriceSeries,
    nasdaq: &PriceSeries,
) -> ChartSpec {
    let line = |name: &str, series: &PriceSeries| {
        Trace::line(name, series.timestamps(), series.closes())
    };

    ChartSpec::new("Market Comparison")
        .with_axes("Date", "Close")
        .with_trace(line("Stock", stock))
        .with_trace(line("S&P 500", sp500))
        .with_trace(line("NASDAQ", nasdaq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_line_serializes_dash_and_type_tag() {
        let trace = Trace::dotted_line("Forecasted Prices", Vec::new(), Vec::new());
        let json = serde_json::to_value(&trace).expect("serialize");

        assert_eq!(json["type"], "line");
        assert_eq!(json["dash"], "dot");
    }

    #[test]
    fn plain_line_omits_dash() {
        let json = serde_json::to_value(Trace::line("Stock", Vec::new(), Vec::new()))
            .expect("serialize");
        assert!(json.get("dash").is_none());
    }

    #[test]
    fn new_chart_uses_dark_template() {
        let chart = ChartSpec::new("x").with_axes("Date", "Price");
        assert_eq!(chart.template, DARK_TEMPLATE);
        assert_eq!(chart.y_axis_title.as_deref(), Some("Price"));
        assert!(chart.trace("missing").is_none());
    }
}
