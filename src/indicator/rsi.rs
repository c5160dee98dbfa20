use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices};
use crate::model::PriceBar;

/// RSI (Relative Strength Index) using Wilder's smoothing method.
///
/// Gains and losses are smoothed with the recursive form
/// `avg = alpha * x + (1 - alpha) * avg` where `alpha = 1 / period`, seeded
/// with the first close-to-close change. The first defined value sits at
/// index `period`.
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }
}

impl Indicator for Rsi {
    fn required_bars(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let prices = close_prices(bars);
        let mut results = vec![None; prices.len()];
        if prices.len() < self.required_bars() {
            return results;
        }

        let alpha = 1.0 / self.period as f64;
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;

        for t in 1..prices.len() {
            let delta = prices[t] - prices[t - 1];
            let gain = delta.max(0.0);
            let loss = (-delta).max(0.0);
            if t == 1 {
                avg_gain = gain;
                avg_loss = loss;
            } else {
                avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
                avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
            }
            if t >= self.period {
                results[t] = Some(rsi_value(avg_gain, avg_loss));
            }
        }

        results
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_support::bars_from_closes;

    #[test]
    fn rsi_period_zero_invalid() {
        assert!(Rsi::new(0).is_err());
    }

    #[test]
    fn rsi_insufficient_data_is_all_undefined() {
        let rsi = Rsi::new(14).unwrap();
        let values = rsi.calculate(&bars_from_closes(&[1.0; 10]));
        assert_eq!(values.len(), 10);
        assert!(values.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_empty_input() {
        let rsi = Rsi::new(5).unwrap();
        assert!(rsi.calculate(&[]).is_empty());
    }

    #[test]
    fn rsi_warm_up_prefix() {
        let rsi = Rsi::new(5).unwrap();
        let values = rsi.calculate(&bars_from_closes(&[1.0, 2.0, 1.5, 3.0, 2.5, 2.0, 4.0]));
        assert!(values[..5].iter().all(Option::is_none));
        assert!(values[5..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_exactly_required_bars_defines_last_value() {
        let rsi = Rsi::new(5).unwrap();
        let values = rsi.calculate(&bars_from_closes(&[5.0, 4.0, 6.0, 5.0, 7.0, 6.0]));
        assert!(values[..5].iter().all(Option::is_none));
        assert!(values[5].is_some());
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let rsi = Rsi::new(5).unwrap();
        let closes: Vec<f64> = (0..12).map(|i| 50.0 + i as f64 * 1.5).collect();
        let values = rsi.calculate(&bars_from_closes(&closes));
        let defined: Vec<f64> = values.iter().flatten().copied().collect();
        assert_eq!(defined.len(), 7);
        assert!(defined.iter().all(|&v| v == 100.0));
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let rsi = Rsi::new(5).unwrap();
        let closes: Vec<f64> = (0..12).map(|i| 80.0 - i as f64 * 2.0).collect();
        let values = rsi.calculate(&bars_from_closes(&closes));
        let defined: Vec<f64> = values.iter().flatten().copied().collect();
        assert_eq!(defined.len(), 7);
        assert!(defined.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rsi_flat_series_saturates_at_100() {
        let rsi = Rsi::new(5).unwrap();
        let values = rsi.calculate(&bars_from_closes(&[42.0; 10]));
        for v in values.iter().flatten() {
            assert_eq!(*v, 100.0);
        }
    }

    #[test]
    fn rsi_golden_values() {
        let closes = [
            100.0, 102.0, 101.0, 105.0, 107.0, 104.0, 103.0, 106.0, 108.0, 107.0, 110.0, 109.0,
        ];
        let expected = [
            70.15635622025833,
            63.41988016592411,
            73.10440258676682,
            77.9656899603225,
            70.05213712857329,
            78.30850083010267,
            70.23994345595112,
        ];
        let values = Rsi::new(5).unwrap().calculate(&bars_from_closes(&closes));
        assert!(values[..5].iter().all(Option::is_none));
        for (offset, want) in expected.iter().enumerate() {
            let got = values[5 + offset].unwrap();
            assert!(
                (got - want).abs() < 1e-6,
                "index {}: got {got}, want {want}",
                5 + offset
            );
        }
    }

    #[test]
    fn rsi_stays_in_bounds() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + ((i * 13) % 17) as f64 - 8.0)
            .collect();
        let values = Rsi::new(5).unwrap().calculate(&bars_from_closes(&closes));
        for v in values.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }
}
