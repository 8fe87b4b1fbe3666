use std::io::{self, Write};

use tickerdash_core::{Dashboard, DashboardPanels, Envelope, OhlcvField, Trace};

use crate::cli::OutputFormat;
use crate::commands::{CommandData, PeriodInfo};
use crate::error::CliError;

pub fn render_stdout(
    envelope: &Envelope<CommandData>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&mut out, envelope, format, pretty)?;
    out.flush()?;
    Ok(())
}

pub fn render<W: Write>(
    out: &mut W,
    envelope: &Envelope<CommandData>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", envelope.to_json(pretty)?)?,
        OutputFormat::Ndjson => writeln!(out, "{}", envelope.to_json(false)?)?,
        OutputFormat::Table => render_table(out, envelope)?,
    }

    Ok(())
}

fn render_table<W: Write>(out: &mut W, envelope: &Envelope<CommandData>) -> Result<(), CliError> {
    match &envelope.data {
        CommandData::Dashboard(dashboard) => render_dashboard(out, dashboard)?,
        CommandData::Periods(periods) => render_periods(out, periods)?,
    }

    for warning in &envelope.meta.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    for error in &envelope.errors {
        writeln!(out, "error [{}]: {}", error.code, error.message)?;
    }

    writeln!(
        out,
        "-- request {} | {} | latency {} ms | cache_hit {}",
        envelope.meta.request_id,
        envelope
            .meta
            .source_chain
            .iter()
            .map(|source| source.as_str())
            .collect::<Vec<_>>()
            .join(","),
        envelope.meta.latency_ms,
        envelope.meta.cache_hit
    )?;
    Ok(())
}

fn render_dashboard<W: Write>(out: &mut W, dashboard: &Dashboard) -> io::Result<()> {
    writeln!(out, "{} ({})", dashboard.symbol, dashboard.period.label())?;
    writeln!(out, "generated_at: {}", dashboard.generated_at)?;

    let Some(panels) = &dashboard.panels else {
        // The error itself is printed with the envelope errors.
        return Ok(());
    };

    let metric = &panels.metric;
    match metric.delta_text() {
        Some(delta) => writeln!(out, "{}: {}  {}", metric.label, metric.value_text(), delta)?,
        None => writeln!(out, "{}: {}", metric.label, metric.value_text())?,
    }
    if let Some(alert) = &panels.alert {
        writeln!(out, "{}", alert.message)?;
    }

    render_indicators(out, panels)?;
    render_correlation(out, panels)?;
    render_forecast(out, panels)?;

    if let Some(comparison) = &panels.charts.comparison {
        writeln!(out)?;
        writeln!(out, "{}", comparison.title)?;
        for trace in &comparison.traces {
            if let Trace::Line { name, y, .. } = trace {
                if let Some(last) = y.last() {
                    writeln!(out, "  {name:<8} last close {last:>12.2}")?;
                }
            }
        }
    }

    Ok(())
}

fn render_indicators<W: Write>(out: &mut W, panels: &DashboardPanels) -> io::Result<()> {
    let indicators = &panels.indicators;
    writeln!(out)?;
    writeln!(out, "bars: {}", panels.bars)?;
    if let (Some(sma), Some(ema)) = (indicators.sma.last(), indicators.ema.last()) {
        writeln!(out, "  {:<12} {sma:>12.2}", indicators.sma_label())?;
        writeln!(out, "  {:<12} {ema:>12.2}", indicators.ema_label())?;
    }
    Ok(())
}

fn render_correlation<W: Write>(out: &mut W, panels: &DashboardPanels) -> io::Result<()> {
    let matrix = &panels.correlation;
    writeln!(out)?;
    write!(out, "{:<8}", "")?;
    for field in OhlcvField::ALL {
        write!(out, "{:>8}", field.as_str())?;
    }
    writeln!(out)?;

    for row in OhlcvField::ALL {
        write!(out, "{:<8}", row.as_str())?;
        for column in OhlcvField::ALL {
            let value = matrix.get(row, column);
            if value.is_nan() {
                write!(out, "{:>8}", "n/a")?;
            } else {
                write!(out, "{value:>8.2}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_forecast<W: Write>(out: &mut W, panels: &DashboardPanels) -> io::Result<()> {
    let forecast = &panels.forecast;
    writeln!(out)?;
    writeln!(out, "{}", panels.charts.forecast.title)?;
    writeln!(
        out,
        "  trend: {:+.4}/day, intercept {:.2}",
        forecast.trend.slope, forecast.trend.intercept
    )?;
    for point in &forecast.points {
        writeln!(
            out,
            "  {}  {:>12.2}",
            point.ts.date(),
            point.forecasted_price
        )?;
    }
    Ok(())
}

fn render_periods<W: Write>(out: &mut W, periods: &[PeriodInfo]) -> io::Result<()> {
    writeln!(out, "{:<6} {:<10} {:>12}", "token", "label", "trading_days")?;
    for period in periods {
        writeln!(
            out,
            "{:<6} {:<10} {:>12}",
            period.token.as_str(),
            period.label,
            period.trading_days
        )?;
    }
    Ok(())
}
