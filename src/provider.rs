pub mod yahoo;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::ProviderError;
use crate::model::PriceBar;

/// Source of daily price history for a single ticker.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn PriceProvider`).
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch daily bars for `symbol` over the trailing `range`
    /// (e.g. `"3mo"`), oldest first.
    fn fetch_daily(
        &self,
        symbol: &str,
        range: &str,
    ) -> BoxFuture<'_, Result<Vec<PriceBar>, Report<ProviderError>>>;
}
