//! `define_port_error!`: a `thiserror` enum whose struct variants each get a
//! snake_case constructor taking `impl Into<_>` for every field.
//!
//! ```ignore
//! define_port_error! {
//!     pub enum RelayError {
//!         Timeout { seconds: u64 } => "timed out after {seconds}s",
//!     }
//! }
//! let err = RelayError::timeout(5_u64);
//! ```

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use crate::domain::validation::FieldError;

    define_port_error! {
        pub enum RelayError {
            Unavailable { message: String } => "unavailable: {message}",
            Refused { status: u16 } => "refused with status {status}",
            Rejected { reason: FieldError } => "rejected: {reason}",
            Bounced { address: String, status: u16 } => "{address} bounced with {status}",
        }
    }

    #[test]
    fn string_fields_take_str() {
        assert_eq!(
            RelayError::unavailable("pool exhausted").to_string(),
            "unavailable: pool exhausted"
        );
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        assert_eq!(RelayError::refused(502_u16), RelayError::Refused { status: 502 });
    }

    #[test]
    fn domain_values_pass_through() {
        let err = RelayError::rejected(FieldError::new("hatched", "overflow", "too many"));
        assert_eq!(err.to_string(), "rejected: too many");
    }

    #[test]
    fn multi_field_constructors_follow_declaration_order() {
        let err = RelayError::bounced("vet@example.com", 550_u16);
        assert_eq!(err.to_string(), "vet@example.com bounced with 550");
    }
}
