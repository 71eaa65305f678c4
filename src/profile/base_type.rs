//! The FIT base types.

use core::fmt;

/// An on-wire base type, as named by the third byte of a field definition.
///
/// Each base type carries a fixed size (strings are sized per unit), a
/// signedness, and a reserved 'invalid' value marking an absent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Enum,
    Sint8,
    Uint8,
    Sint16,
    Uint16,
    Sint32,
    Uint32,
    String,
    Float32,
    Float64,
    Uint8z,
    Uint16z,
    Uint32z,
    Byte,
}

impl BaseType {
    /// Look up a base type by its on-wire code.
    pub fn from_code(code: u8) -> Option<BaseType> {
        Some(match code {
            0x00 => BaseType::Enum,
            0x01 => BaseType::Sint8,
            0x02 => BaseType::Uint8,
            0x83 => BaseType::Sint16,
            0x84 => BaseType::Uint16,
            0x85 => BaseType::Sint32,
            0x86 => BaseType::Uint32,
            0x07 => BaseType::String,
            0x88 => BaseType::Float32,
            0x89 => BaseType::Float64,
            0x0A => BaseType::Uint8z,
            0x8B => BaseType::Uint16z,
            0x8C => BaseType::Uint32z,
            0x0D => BaseType::Byte,
            _ => return None,
        })
    }

    /// The on-wire size of one unit of this base type, in bytes.
    pub fn size(self) -> usize {
        match self {
            BaseType::Enum
            | BaseType::Sint8
            | BaseType::Uint8
            | BaseType::String
            | BaseType::Uint8z
            | BaseType::Byte => 1,
            BaseType::Sint16 | BaseType::Uint16 | BaseType::Uint16z => 2,
            BaseType::Sint32 | BaseType::Uint32 | BaseType::Uint32z | BaseType::Float32 => 4,
            BaseType::Float64 => 8,
        }
    }

    /// Whether values of this base type carry a sign.
    pub fn signed(self) -> bool {
        matches!(
            self,
            BaseType::Sint8
                | BaseType::Sint16
                | BaseType::Sint32
                | BaseType::Float32
                | BaseType::Float64
        )
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaseType::Enum => "enum",
            BaseType::Sint8 => "sint8",
            BaseType::Uint8 => "uint8",
            BaseType::Sint16 => "sint16",
            BaseType::Uint16 => "uint16",
            BaseType::Sint32 => "sint32",
            BaseType::Uint32 => "uint32",
            BaseType::String => "string",
            BaseType::Float32 => "float32",
            BaseType::Float64 => "float64",
            BaseType::Uint8z => "uint8z",
            BaseType::Uint16z => "uint16z",
            BaseType::Uint32z => "uint32z",
            BaseType::Byte => "byte",
        };

        f.write_str(name)
    }
}
