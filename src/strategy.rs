use crate::model::LatestSnapshot;

/// Lookback of the RSI the swing-entry rule reads.
pub const RSI_PERIOD: usize = 5;
/// RSI level the latest value must fall strictly below.
pub const RSI_THRESHOLD: f64 = 30.0;
/// Window of the moving average the close must sit strictly below.
pub const SMA_WINDOW: usize = 50;

/// Result of evaluating the swing-entry rule against the latest snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationResult {
    pub triggered: bool,
    pub snapshot: LatestSnapshot,
}

/// Evaluate the swing-entry rule: RSI(5) below 30 and close below SMA(50).
///
/// Undefined indicator values never trigger. Each call is independent.
pub fn evaluate(snapshot: &LatestSnapshot) -> EvaluationResult {
    let triggered = is_triggered(snapshot.close, snapshot.rsi, snapshot.sma_50);
    EvaluationResult {
        triggered,
        snapshot: *snapshot,
    }
}

fn is_triggered(close: f64, rsi: Option<f64>, sma: Option<f64>) -> bool {
    match (rsi, sma) {
        (Some(rsi), Some(sma)) => rsi < RSI_THRESHOLD && close < sma,
        _ => false,
    }
}
