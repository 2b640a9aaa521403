//! Notifier adapters.
//!
//! [`LogNotifier`] records notices through `tracing` and is the default when
//! no relay is configured. [`HttpRelayNotifier`] posts them as JSON to a
//! mail relay.

mod http_relay;

use async_trait::async_trait;
use tracing::info;

use crate::domain::Notice;
use crate::domain::ports::{Notifier, NotifierError};

pub use http_relay::HttpRelayNotifier;

/// Notifier that only logs what it would have sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifierError> {
        info!(
            recipients = ?notice.recipients,
            subject = %notice.subject,
            has_html = notice.html.is_some(),
            "notification logged (no relay configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let notice = Notice::plain(vec!["admin@example.com".to_owned()], "Hello", "Body");
        LogNotifier.notify(&notice).await.expect("logging never fails");
    }
}
