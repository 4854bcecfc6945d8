//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Several domain enums travel as fixed lowercase strings (channel types,
//! recurrence classes). This macro keeps the string table in one place.
//!
//! # Example
//!
//! ```rust
//! use calbot_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Visibility {
//!     Public,
//!     External,
//! }
//!
//! impl_domain_status_conversions!(Visibility {
//!     Public => "public",
//!     External => "external",
//! });
//!
//! assert_eq!("PUBLIC".parse::<Visibility>(), Ok(Visibility::Public));
//! assert_eq!(Visibility::External.to_string(), "external");
//! ```

/// Implements Display and FromStr traits for string-backed enums
///
/// - Display writes the mapped string
/// - FromStr parses case-insensitively and names the enum in its error
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
