//! The product profile: base types, per-message field metadata, and the
//! decoded message types.
//!
//! A definition message names fields by number and base type only; the
//! profile supplies the meaning. [`field`] returns the metadata for a known
//! `(message, field)` pair, and [`known`] reports whether a global message
//! number has a decoded representation at all. Fields and messages outside
//! the profile are not errors — the decoder counts them and carries on.

pub mod base_type;
pub mod messages;

use chrono::{DateTime, FixedOffset, Utc};

pub use base_type::BaseType;
pub use messages::{field, known, Message};

/// Profile metadata for one field of one message.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    /// Field definition number.
    pub num: u8,
    /// The base type the profile declares for the field.
    pub base_type: BaseType,
    /// How the decoded bytes are interpreted.
    pub kind: FieldKind,
    /// Whether the field holds a sequence of units rather than one.
    pub array: bool,
}

impl FieldInfo {
    pub(crate) const fn array(self) -> FieldInfo {
        FieldInfo { array: true, ..self }
    }
}

/// The semantic interpretation of a field's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A plain FIT value: integer, float, string, or an array of them.
    Fit,
    /// Seconds since the FIT epoch, in UTC.
    TimeUtc,
    /// Seconds since the FIT epoch, in the device's local time.
    TimeLocal,
    /// A latitude in semicircles.
    Lat,
    /// A longitude in semicircles.
    Lng,
}

/// A latitude, stored in semicircles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latitude(i32);

/// A longitude, stored in semicircles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Longitude(i32);

macro_rules! coordinate {
    ($t:ident) => {
        impl $t {
            pub(crate) const INVALID: $t = $t(i32::MAX);

            /// Wrap a raw semicircle value.
            pub fn from_semicircles(semicircles: i32) -> $t {
                $t(semicircles)
            }

            /// The raw semicircle value.
            pub fn semicircles(self) -> i32 {
                self.0
            }

            /// The coordinate in degrees.
            pub fn degrees(self) -> f64 {
                self.0 as f64 * (180.0 / (1u64 << 31) as f64)
            }

            /// Whether the coordinate holds a value other than the invalid
            /// marker.
            pub fn is_valid(self) -> bool {
                self.0 != i32::MAX
            }
        }
    };
}

coordinate!(Latitude);
coordinate!(Longitude);

/// A decoded field value, ready to publish into a message.
///
/// Integer values are widened to 64 bits on decoding and narrowed again by
/// the receiving field's setter, mirroring how the wire may carry a field
/// narrower than the profile declares.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Uint(u64),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    UintArray(Vec<u64>),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    StrArray(Vec<String>),
    Time(DateTime<Utc>),
    LocalTime(DateTime<FixedOffset>),
    Lat(Latitude),
    Lng(Longitude),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_from_semicircles() {
        assert_eq!(Latitude::from_semicircles(0).degrees(), 0.0);
        assert_eq!(Latitude::from_semicircles(i32::MIN).degrees(), -180.0);

        let quarter = Longitude::from_semicircles(1 << 29);
        assert!((quarter.degrees() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_coordinate() {
        assert!(!Latitude::INVALID.is_valid());
        assert!(Longitude::from_semicircles(0).is_valid());
    }
}
