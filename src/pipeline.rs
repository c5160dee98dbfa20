use error_stack::{Report, ResultExt};
use tracing::{error, info, warn};

use crate::alert;
use crate::chart::ChartRenderer;
use crate::error::RunError;
use crate::indicator::IndicatorSeries;
use crate::notifier::Notifier;
use crate::provider::PriceProvider;
use crate::strategy::evaluate;

/// How a single check ended. Every variant is a clean exit for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The provider failed or returned no usable bars.
    DataUnavailable,
    /// Not enough bars for RSI(5) and SMA(50) on the latest day.
    InsufficientHistory,
    NoSignal,
    Alerted,
    /// The alert fired but the notifier failed; the chart stays on disk.
    DeliveryFailed,
}

/// Run one fetch → compute → evaluate → notify pass for `symbol`.
///
/// Only chart rendering faults are returned as errors; provider and delivery
/// failures are logged and reported through the outcome.
pub async fn check_symbol(
    symbol: &str,
    range: &str,
    provider: &dyn PriceProvider,
    renderer: &dyn ChartRenderer,
    notifier: &dyn Notifier,
) -> Result<RunOutcome, Report<RunError>> {
    let bars = match provider.fetch_daily(symbol, range).await {
        Ok(bars) => bars,
        Err(e) => {
            warn!(error = ?e, provider = provider.name(), symbol, "price history unavailable");
            return Ok(RunOutcome::DataUnavailable);
        }
    };

    if bars.is_empty() {
        warn!(provider = provider.name(), symbol, "no close data returned");
        return Ok(RunOutcome::DataUnavailable);
    }

    let series = IndicatorSeries::compute(&bars).change_context(RunError::Indicator)?;
    let Some(snapshot) = series.latest(&bars) else {
        return Ok(RunOutcome::DataUnavailable);
    };

    let (Some(rsi), Some(sma_50)) = (snapshot.rsi, snapshot.sma_50) else {
        let required = IndicatorSeries::required_bars().change_context(RunError::Indicator)?;
        warn!(
            symbol,
            available = bars.len(),
            required,
            "insufficient history for indicators"
        );
        return Ok(RunOutcome::InsufficientHistory);
    };

    info!(
        symbol,
        date = %snapshot.date,
        sma_50,
        "Price: ${:.2}, RSI(5): {:.2}",
        snapshot.close,
        rsi,
    );

    let result = evaluate(&snapshot);
    if !result.triggered {
        info!(symbol, "no alert conditions met");
        return Ok(RunOutcome::NoSignal);
    }

    let chart = renderer
        .render(symbol, &bars, &series)
        .change_context(RunError::Chart)?;

    let Some(event) = alert::compose(symbol, &result.snapshot, chart) else {
        return Ok(RunOutcome::InsufficientHistory);
    };

    match notifier.notify(&event).await {
        Ok(()) => {
            info!(symbol, subject = %event.subject, "alert delivered");
            Ok(RunOutcome::Alerted)
        }
        Err(e) => {
            error!(
                error = ?e,
                symbol,
                chart = %event.chart.display(),
                "failed to deliver alert"
            );
            Ok(RunOutcome::DeliveryFailed)
        }
    }
}
