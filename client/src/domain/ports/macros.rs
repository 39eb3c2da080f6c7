//! Helper macro for declaring port error enums.
//!
//! Every variant carries named fields and a `thiserror` message. Each one
//! gets a snake_case constructor whose parameters accept anything
//! convertible into the field type.

macro_rules! define_port_error {
    (@ctor $variant:ident ($( $field:ident : $ty:ty, )*)) => {
        ::paste::paste! {
            #[doc = "Build a `" $variant "` from convertible field values."]
            pub fn [<$variant:snake>]($( $field: impl Into<$ty> ),*) -> Self {
                Self::$variant { $( $field: $field.into() ),* }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field : $ty),+ },
            )+
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant ($( $field : $ty, )+));
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructors generated for the crate's port errors.
    use crate::domain::ports::{RemoteApiError, TokenStoreError};

    #[test]
    fn constructors_convert_borrowed_text() {
        let err = TokenStoreError::corrupt("tokens.json: eof");
        assert_eq!(
            err,
            TokenStoreError::Corrupt {
                message: "tokens.json: eof".to_owned(),
            }
        );
        assert_eq!(err.to_string(), "token storage is unreadable: tokens.json: eof");
    }

    #[test]
    fn multi_field_constructors_keep_parameter_order() {
        let err = RemoteApiError::status(503_u16, String::from("maintenance"));
        assert_eq!(
            err,
            RemoteApiError::Status {
                status: 503,
                message: "maintenance".to_owned(),
            }
        );
        assert_eq!(err.to_string(), "server responded with 503: maintenance");
    }
}
