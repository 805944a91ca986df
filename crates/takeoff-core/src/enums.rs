//! Enum types for takeoff data.
//!
//! Each enum has:
//! - Custom Serialize (as its display label)
//! - Custom Deserialize (known labels + catch-all `Custom(String)`)
//! - `as_str()`, `is_builtin()`, `Display` impl

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Macro: defines an enum with known string variants + a Custom(String) fallback.
// ---------------------------------------------------------------------------
macro_rules! define_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident, custom_variant = $custom_variant:ident,
        variants: [
            $( ($variant:ident, $str:literal $(, $alias:literal)*) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
            $custom_variant(String),
        }

        impl $name {
            /// Returns the string representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $str, )+
                    Self::$custom_variant(s) => s.as_str(),
                }
            }

            /// Returns `true` if this is the default variant.
            pub fn is_default(&self) -> bool {
                *self == Self::$default
            }

            /// Returns `true` if this is a built-in (non-custom) variant.
            pub fn is_builtin(&self) -> bool {
                !matches!(self, Self::$custom_variant(_))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from(s))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $( $str $( | $alias )* => Self::$variant, )+
                    other => Self::$custom_variant(other.to_owned()),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                // Check known variants first to avoid allocation in common case.
                match s.as_str() {
                    $( $str $( | $alias )* => Self::$variant, )+
                    _ => Self::$custom_variant(s),
                }
            }
        }
    };
}

define_enum! {
    /// Unit classification of a parameter. Informational only: the kind never
    /// changes how a value is evaluated.
    ParameterKind, default = Count, custom_variant = Custom,
    variants: [
        (LinearFeet, "Linear Feet", "linear_feet", "LF"),
        (SquareFeet, "Square Feet", "square_feet", "SF"),
        (CubicFeet, "Cubic Feet", "cubic_feet", "CF"),
        (Count, "Count", "count", "EA"),
        (Hours, "Hours", "hours", "HR"),
    ]
}

impl ParameterKind {
    /// Short unit abbreviation for table output.
    pub fn unit(&self) -> &str {
        match self {
            Self::LinearFeet => "lf",
            Self::SquareFeet => "sf",
            Self::CubicFeet => "cf",
            Self::Count => "ea",
            Self::Hours => "hr",
            Self::Custom(s) => s.as_str(),
        }
    }
}
