pub mod ma;
pub mod rsi;

use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::ma::Sma;
use crate::indicator::rsi::Rsi;
use crate::model::{LatestSnapshot, PriceBar};
use crate::strategy::{RSI_PERIOD, SMA_WINDOW};

/// Windows of the moving averages drawn on the price panel.
pub const CHART_SMA_WINDOWS: [usize; 3] = [20, SMA_WINDOW, 200];

/// A technical analysis indicator that operates on a slice of daily bars.
///
/// Bars must be in ascending chronological order (oldest first).
pub trait Indicator {
    /// Minimum number of bars required to produce at least one defined value.
    fn required_bars(&self) -> usize;

    /// Calculate indicator values aligned with `bars`.
    ///
    /// The output always has `bars.len()` entries; leading entries are `None`
    /// until the lookback is satisfied. Short input yields all `None`.
    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>>;
}

/// Extract close prices from a slice of bars.
pub fn close_prices(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Every indicator value the alert and the chart need, aligned by index with
/// the bars it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub rsi_5: Vec<Option<f64>>,
    pub sma_20: Vec<Option<f64>>,
    pub sma_50: Vec<Option<f64>>,
    pub sma_200: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn compute(bars: &[PriceBar]) -> Result<Self, Report<IndicatorError>> {
        let [fast, slow, long] = CHART_SMA_WINDOWS;
        Ok(Self {
            rsi_5: Rsi::new(RSI_PERIOD)?.calculate(bars),
            sma_20: Sma::new(fast)?.calculate(bars),
            sma_50: Sma::new(slow)?.calculate(bars),
            sma_200: Sma::new(long)?.calculate(bars),
        })
    }

    /// Bars needed before the swing-entry rule has both of its inputs.
    pub fn required_bars() -> Result<usize, Report<IndicatorError>> {
        let rsi = Rsi::new(RSI_PERIOD)?.required_bars();
        let sma = Sma::new(SMA_WINDOW)?.required_bars();
        Ok(rsi.max(sma))
    }

    /// Snapshot of the last bar, or `None` when `bars` is empty.
    pub fn latest(&self, bars: &[PriceBar]) -> Option<LatestSnapshot> {
        let last = bars.last()?;
        let index = bars.len() - 1;
        Some(LatestSnapshot {
            date: last.date,
            close: last.close,
            rsi: self.rsi_5.get(index).copied().flatten(),
            sma_50: self.sma_50.get(index).copied().flatten(),
        })
    }
}
