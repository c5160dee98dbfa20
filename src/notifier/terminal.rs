use error_stack::Report;
use futures::future::BoxFuture;

use crate::alert::AlertEvent;
use crate::error::NotifyError;
use crate::notifier::Notifier;

/// Logs the alert instead of delivering it; used by `--dry-run`.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify<'a>(
        &'a self,
        event: &'a AlertEvent,
    ) -> BoxFuture<'a, Result<(), Report<NotifyError>>> {
        Box::pin(async move {
            tracing::warn!(
                subject = %event.subject,
                price = event.price,
                chart = %event.chart.display(),
                "ALERT: {}",
                event.body,
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[tokio::test]
    async fn terminal_notifier_always_succeeds() {
        let event = AlertEvent {
            subject: "AMZN RSI(5) below 30 swing-entry signal".into(),
            body: "RSI(5) is 22.10".into(),
            price: 171.2,
            chart: PathBuf::from("amzn_rsi_sma_chart.png"),
        };
        assert!(TerminalNotifier.notify(&event).await.is_ok());
    }
}
