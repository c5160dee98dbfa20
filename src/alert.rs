use std::path::PathBuf;

use crate::model::LatestSnapshot;
use crate::strategy::{RSI_PERIOD, RSI_THRESHOLD, SMA_WINDOW};

/// A composed alert, ready to hand to a `Notifier`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub subject: String,
    pub body: String,
    pub price: f64,
    pub chart: PathBuf,
}

/// Build the swing-entry alert for `symbol`.
///
/// Returns `None` when the snapshot is missing the RSI or SMA value the
/// message reports.
pub fn compose(symbol: &str, snapshot: &LatestSnapshot, chart: PathBuf) -> Option<AlertEvent> {
    let rsi = snapshot.rsi?;
    let sma = snapshot.sma_50?;
    let price = snapshot.close;

    Some(AlertEvent {
        subject: subject(symbol),
        body: format!(
            "RSI({RSI_PERIOD}) is {rsi:.2} and price (${price:.2}) is below SMA({SMA_WINDOW}) (${sma:.2}).\n\n\
             Current {symbol} Price: ${price:.2}"
        ),
        price,
        chart,
    })
}

fn subject(symbol: &str) -> String {
    format!("{symbol} RSI({RSI_PERIOD}) below {RSI_THRESHOLD:.0} swing-entry signal")
}
