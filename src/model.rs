use chrono::NaiveDate;

/// One trading day of OHLCV data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// The most recent bar together with the indicator values aligned to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
    pub sma_50: Option<f64>,
}
