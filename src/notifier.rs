pub mod email;
pub mod terminal;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::alert::AlertEvent;
use crate::error::NotifyError;

/// Sink for alert notifications.
pub trait Notifier: Send + Sync {
    fn notify<'a>(
        &'a self,
        event: &'a AlertEvent,
    ) -> BoxFuture<'a, Result<(), Report<NotifyError>>>;
}
