//! Shared helpers for the Diesel adapters.
//!
//! - Error mapping from pool and Diesel failures to [`StoreError`]
//! - Friendly messages for the named unique constraints
//! - Integer casts between `INTEGER` columns and domain counts

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::ports::StoreError;

use super::pool::PoolError;

/// Map pool failures to a connection error.
pub(crate) fn map_pool_error(error: PoolError) -> StoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreError::connection(message)
        }
    }
}

/// Human-readable message for a violated unique constraint.
fn unique_violation_message(constraint_name: Option<&str>) -> String {
    match constraint_name {
        Some("accounts_username_key") => "username is already taken".to_owned(),
        Some("chicken_batches_farm_batch_number_key") => {
            "batch number already used on this farm".to_owned()
        }
        Some("milk_production_cow_date_session_key") => {
            "milk already recorded for this cow, date and session".to_owned()
        }
        Some("restock_alerts_open_item_key") => {
            "an unresolved restock alert already exists for this item".to_owned()
        }
        Some(other) => {
            warn!(constraint = other, "unrecognised unique constraint violation");
            "record already exists".to_owned()
        }
        None => "record already exists".to_owned(),
    }
}

/// Map Diesel errors to store errors, logging the failure kind at debug.
pub(crate) fn map_diesel_error(error: DieselError) -> StoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            %error,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => StoreError::query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => {
                StoreError::conflict(unique_violation_message(info.constraint_name()))
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                StoreError::conflict("a referenced record no longer exists")
            }
            DatabaseErrorKind::ClosedConnection => {
                StoreError::connection("database connection error")
            }
            _ => StoreError::query("database error"),
        },
        _ => StoreError::query("database error"),
    }
}

impl From<DieselError> for StoreError {
    fn from(error: DieselError) -> Self {
        map_diesel_error(error)
    }
}

/// Read a non-negative `INTEGER` column into a domain count.
pub(crate) fn count_from_db(column: &'static str, value: i32) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| StoreError::query(format!("negative value {value} stored in {column}")))
}

/// Write a domain count into an `INTEGER` column.
pub(crate) fn count_to_db(column: &'static str, value: u32) -> Result<i32, StoreError> {
    i32::try_from(value)
        .map_err(|_| StoreError::query(format!("{column} value {value} exceeds column range")))
}

/// Decode an enum stored as text.
pub(crate) fn decode_label<T>(
    column: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, StoreError> {
    parse(raw).ok_or_else(|| StoreError::query(format!("unknown {column} `{raw}` in database")))
}
