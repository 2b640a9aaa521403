//! Port for fire-and-forget outbound notifications.
use async_trait::async_trait;

use crate::domain::notice::Notice;

use super::define_port_error;

define_port_error! {
    /// Delivery failures. Callers log these and carry on.
    pub enum NotifierError {
        /// The transport could not deliver the message.
        Transport { message: String } => "notification transport failed: {message}",
        /// The relay answered with a non-success status.
        Refused { status: u16 } => "notification relay refused message with status {status}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `notice` to its recipients.
    async fn notify(&self, notice: &Notice) -> Result<(), NotifierError>;
}
