use chrono::DateTime;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::model::PriceBar;
use crate::provider::PriceProvider;

const PROVIDER: &str = "yahoo";
// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; swing-notifier/0.1)";

/// Daily history from the Yahoo Finance v8 chart endpoint.
pub struct YahooFinance {
    client: reqwest::Client,
    base_url: String,
}

impl YahooFinance {
    pub fn new(base_url: &str) -> Result<Self, Report<ProviderError>> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .change_context(ProviderError::Client {
                provider: PROVIDER.into(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

impl PriceProvider for YahooFinance {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch_daily(
        &self,
        symbol: &str,
        range: &str,
    ) -> BoxFuture<'_, Result<Vec<PriceBar>, Report<ProviderError>>> {
        let symbol = symbol.to_owned();
        let range = range.to_owned();
        Box::pin(async move {
            let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
            let params = [("range", range.as_str()), ("interval", "1d")];

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .change_context(ProviderError::Request {
                    provider: PROVIDER.into(),
                })
                .attach_with(|| format!("url: {url}"))?;

            if !response.status().is_success() {
                return Err(Report::new(ProviderError::Request {
                    provider: PROVIDER.into(),
                })
                .attach(format!("HTTP status: {}", response.status())));
            }

            let raw: ChartResponse =
                response
                    .json()
                    .await
                    .change_context(ProviderError::ResponseParse {
                        provider: PROVIDER.into(),
                    })?;

            let bars = raw.into_bars()?;

            info!(
                symbol = %symbol,
                range = %range,
                fetched = bars.len(),
                "yahoo daily history fetch complete"
            );

            Ok(bars)
        })
    }
}

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChartErrorBody {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Flatten Yahoo's column arrays into bars, skipping days without a close.
    fn into_bars(self) -> Result<Vec<PriceBar>, Report<ProviderError>> {
        if let Some(err) = self.chart.error {
            return Err(Report::new(ProviderError::ResponseParse {
                provider: PROVIDER.into(),
            })
            .attach(format!("{}: {}", err.code, err.description)));
        }

        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };

        let offset = result.meta.gmtoffset;
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let Some(close) = at(&quote.close, i) else {
                debug!(timestamp = ts, "skipping row without close");
                continue;
            };
            let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|d| d.date_naive())
            else {
                debug!(timestamp = ts, "skipping row with out-of-range timestamp");
                continue;
            };
            bars.push(PriceBar {
                date,
                open: at(&quote.open, i).unwrap_or(close),
                high: at(&quote.high, i).unwrap_or(close),
                low: at(&quote.low, i).unwrap_or(close),
                close,
                volume: at(&quote.volume, i).unwrap_or(0.0),
            });
        }

        bars.sort_by_key(|b| b.date);
        // A same-day live row follows the daily row; fold it in so the latest price wins.
        bars.dedup_by(|later, earlier| {
            if later.date != earlier.date {
                return false;
            }
            earlier.high = earlier.high.max(later.high);
            earlier.low = earlier.low.min(later.low);
            earlier.close = later.close;
            earlier.volume = earlier.volume.max(later.volume);
            true
        });
        Ok(bars)
    }
}
