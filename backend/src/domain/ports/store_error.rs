//! Error type shared by every entity store port.

use crate::domain::Error;
use crate::domain::validation::FieldError;

use super::define_port_error;

define_port_error! {
    /// Failures raised by entity store adapters.
    pub enum StoreError {
        /// The store could not be reached.
        Connection { message: String } => "store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "store query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict { message: String } => "conflicting record: {message}",
        /// The write would break a domain rule enforced by the store.
        Rejected { reason: FieldError } => "store rejected the change: {reason}",
    }
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Connection { message } => {
                Error::service_unavailable(format!("entity store unavailable: {message}"))
            }
            StoreError::Query { message } => Error::internal(format!("entity store error: {message}")),
            StoreError::Conflict { message } => Error::conflict(message),
            StoreError::Rejected { reason } => reason.into(),
        }
    }
}
