//! Reqwest-backed mail relay notifier.
//!
//! Each notice becomes one `POST` of a JSON message to the relay endpoint.
//! Any 2xx answer counts as delivered.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::domain::Notice;
use crate::domain::ports::{Notifier, NotifierError};

/// JSON body sent to the relay.
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

/// Notifier posting to an HTTP mail relay.
pub struct HttpRelayNotifier {
    client: Client,
    endpoint: Url,
    from: String,
}

impl HttpRelayNotifier {
    /// Build a notifier with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, from: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            from,
        })
    }

    fn message<'a>(&'a self, notice: &'a Notice) -> RelayMessage<'a> {
        RelayMessage {
            from: &self.from,
            to: &notice.recipients,
            subject: &notice.subject,
            text: &notice.text,
            html: notice.html.as_deref(),
        }
    }
}

#[async_trait]
impl Notifier for HttpRelayNotifier {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifierError> {
        if notice.recipients.is_empty() {
            return Ok(());
        }
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&self.message(notice))
            .send()
            .await
            .map_err(|error| NotifierError::transport(error.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifierError::refused(status.as_u16()))
        }
    }
}
