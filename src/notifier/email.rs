use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::alert::AlertEvent;
use crate::config::{MailConfig, MailCredentials};
use crate::error::NotifyError;
use crate::notifier::Notifier;

/// Delivers alerts over SMTP with implicit TLS, chart attached as PNG.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(
        mail: &MailConfig,
        credentials: MailCredentials,
    ) -> Result<Self, Report<NotifyError>> {
        let sender = if mail.from.is_empty() {
            credentials.username.as_str()
        } else {
            mail.from.as_str()
        };
        let from = parse_mailbox(sender)?;
        let to = parse_mailbox(&mail.to)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&mail.smtp_host)
            .change_context(NotifyError::Transport)
            .attach_with(|| format!("host: {}", mail.smtp_host))?
            .port(mail.smtp_port)
            .credentials(Credentials::new(credentials.username, credentials.password))
            .build();

        Ok(Self { transport, from, to })
    }
}

impl Notifier for EmailNotifier {
    fn notify<'a>(
        &'a self,
        event: &'a AlertEvent,
    ) -> BoxFuture<'a, Result<(), Report<NotifyError>>> {
        Box::pin(async move {
            let image = tokio::fs::read(&event.chart)
                .await
                .change_context(NotifyError::Attachment)
                .attach_with(|| format!("path: {}", event.chart.display()))?;

            let message = build_message(&self.from, &self.to, event, image)?;

            self.transport
                .send(message)
                .await
                .change_context(NotifyError::Transport)?;

            info!(to = %self.to, subject = %event.subject, "alert email sent");
            Ok(())
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, Report<NotifyError>> {
    address
        .parse::<Mailbox>()
        .change_context(NotifyError::Address)
        .attach_with(|| format!("address: {address:?}"))
}

fn build_message(
    from: &Mailbox,
    to: &Mailbox,
    event: &AlertEvent,
    image: Vec<u8>,
) -> Result<Message, Report<NotifyError>> {
    let filename = event
        .chart
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("chart.png")
        .to_owned();
    let png = ContentType::parse("image/png").change_context(NotifyError::Build)?;

    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(event.subject.as_str())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(event.body.clone()))
                .singlepart(Attachment::new(filename).body(image, png)),
        )
        .change_context(NotifyError::Build)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn event() -> AlertEvent {
        AlertEvent {
            subject: "AMZN RSI(5) below 30 swing-entry signal".into(),
            body: "RSI(5) is 24.31 and price ($171.20) is below SMA(50) ($190.44).".into(),
            price: 171.2,
            chart: PathBuf::from("/tmp/charts/amzn_rsi_sma_chart.png"),
        }
    }

    #[test]
    fn message_carries_subject_and_attachment() {
        let from = parse_mailbox("bot@example.com").unwrap();
        let to = parse_mailbox("Trader <trader@example.com>").unwrap();
        let message = build_message(&from, &to, &event(), vec![0x89, b'P', b'N', b'G']).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(raw.contains("Subject: AMZN RSI(5) below 30 swing-entry signal"));
        assert!(raw.contains("amzn_rsi_sma_chart.png"));
        assert!(raw.contains("image/png"));
        assert!(raw.contains("trader@example.com"));
    }

    #[test]
    fn invalid_address_rejected() {
        assert!(parse_mailbox("not an address").is_err());
        assert!(parse_mailbox("").is_err());
    }

    #[tokio::test]
    async fn missing_chart_is_attachment_error() {
        let mail = MailConfig {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 465,
            from: String::new(),
            to: "trader@example.com".into(),
        };
        let credentials = MailCredentials {
            username: "bot@example.com".into(),
            password: "secret".into(),
        };
        let notifier = EmailNotifier::new(&mail, credentials).unwrap();
        let mut event = event();
        event.chart = PathBuf::from("/nonexistent/swing-notifier/chart.png");
        let err = notifier.notify(&event).await.unwrap_err();
        assert!(matches!(err.current_context(), NotifyError::Attachment));
    }
}
