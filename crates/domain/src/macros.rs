//! Macro for implementing Display and FromStr for wire-level enums
//!
//! The entity API spells enum values in lowercase (`open`, `closed`,
//! `original`, ...) but is not consistent about case in every response, so
//! parsing is case-insensitive while rendering is always lowercase.
//!
//! # Example
//!
//! ```rust
//! use archivum_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Visibility {
//!     Open,
//!     Closed,
//! }
//!
//! impl_wire_enum_conversions!(Visibility {
//!     Open => "open",
//!     Closed => "closed",
//! });
//!
//! assert_eq!("OPEN".parse::<Visibility>().unwrap(), Visibility::Open);
//! ```

/// Implements `as_str`, Display and FromStr for a lowercase wire enum
///
/// Parsing trims surrounding whitespace and ignores ASCII case. Values that
/// match no variant fail with [`UnknownWireValue`](crate::errors::UnknownWireValue)
/// naming the enum, which converts into `ArchivumError::InvalidInput`.
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Spelling used on the wire.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::errors::UnknownWireValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s.trim();
                $(
                    if value.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::errors::UnknownWireValue {
                    kind: stringify!($enum_name),
                    value: value.to_string(),
                })
            }
        }
    };
}
