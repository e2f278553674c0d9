//! Shared error scaffolding.
//!
//! The store, remote, and config layers each carry a message-struct error
//! that records where it was raised. The shape is identical, so it is
//! stamped out here; the layers add their own `From` conversions.

/// Defines a message-struct error capturing the caller's file and line
/// through `#[track_caller]`.
macro_rules! located_error {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
        #[display("{}: {} at {}:{}", $prefix, message, file, line)]
        pub struct $name {
            /// Error message.
            pub message: String,
            /// Line number where error occurred.
            pub line: u32,
            /// Source file where error occurred.
            pub file: &'static str,
        }

        impl $name {
            /// Creates the error, capturing the caller's location.
            #[track_caller]
            pub fn new(message: impl Into<String>) -> Self {
                let loc = std::panic::Location::caller();
                Self {
                    message: message.into(),
                    line: loc.line(),
                    file: loc.file(),
                }
            }
        }
    };
}

pub(crate) use located_error;
