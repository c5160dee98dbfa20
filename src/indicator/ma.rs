use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices};
use crate::model::PriceBar;

/// Simple Moving Average over closing prices.
pub struct Sma {
    window: usize,
}

impl Sma {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        if window == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "window must be > 0".into(),
            });
        }
        Ok(Self { window })
    }

    /// Calculate SMA values aligned with `prices`.
    pub fn calculate_prices(&self, prices: &[f64]) -> Vec<Option<f64>> {
        let mut output = vec![None; prices.len()];
        let n = self.window as f64;
        for (index, w) in prices.windows(self.window).enumerate() {
            // Summed relative to the window's first close so a constant window is exact.
            let base = w[0];
            let mean = base + w.iter().map(|&p| p - base).sum::<f64>() / n;
            output[index + self.window - 1] = Some(mean);
        }
        output
    }
}

impl Indicator for Sma {
    fn required_bars(&self) -> usize {
        self.window
    }

    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        self.calculate_prices(&close_prices(bars))
    }
}
