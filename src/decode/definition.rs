//! Definition messages: the schema descriptors for data records.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;
use thiserror::Error;

use crate::profile::{self, BaseType};

use super::reader::RecordReader;
use super::{Error as DecodeError, FormatError};

/// The byte order a definition selects for its data records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Arch {
    Little,
    Big,
}

impl Arch {
    pub(super) fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Arch::Little => LittleEndian::read_u16(buf),
            Arch::Big => BigEndian::read_u16(buf),
        }
    }

    /// Read an unsigned integer spanning the whole of `buf`.
    pub(super) fn read_uint(self, buf: &[u8]) -> u64 {
        match self {
            Arch::Little => LittleEndian::read_uint(buf, buf.len()),
            Arch::Big => BigEndian::read_uint(buf, buf.len()),
        }
    }

    /// Read a signed integer spanning the whole of `buf`.
    pub(super) fn read_int(self, buf: &[u8]) -> i64 {
        match self {
            Arch::Little => LittleEndian::read_int(buf, buf.len()),
            Arch::Big => BigEndian::read_int(buf, buf.len()),
        }
    }

    pub(super) fn read_f32(self, buf: &[u8]) -> f32 {
        match self {
            Arch::Little => LittleEndian::read_f32(buf),
            Arch::Big => BigEndian::read_f32(buf),
        }
    }

    pub(super) fn read_f64(self, buf: &[u8]) -> f64 {
        match self {
            Arch::Little => LittleEndian::read_f64(buf),
            Arch::Big => BigEndian::read_f64(buf),
        }
    }
}

/// One field of a definition message.
#[derive(Clone, Copy, Debug)]
pub(super) struct FieldDef {
    pub num: u8,
    pub size: u8,
    pub base_type: BaseType,
}

/// A definition message, registered in its local slot until replaced.
#[derive(Clone, Debug)]
pub(super) struct DefMsg {
    pub local: u8,
    pub arch: Arch,
    pub global: u16,
    pub field_defs: Vec<FieldDef>,
}

impl DefMsg {
    /// Decode the body of a definition record.
    pub(super) fn decode<R: Read>(
        rd: &mut RecordReader<R>,
        local: u8,
        debug_log: bool,
    ) -> Result<DefMsg, DecodeError> {
        // Reserved byte.
        rd.read_byte()?;

        let arch = match rd.read_byte()? {
            0 => Arch::Little,
            1 => Arch::Big,
            other => return Err(FormatError::UnknownArchitecture(other).into()),
        };

        let global = arch.read_u16(&rd.take::<2>()?);
        if global == profile::messages::MESG_NUM_INVALID {
            return Err(FormatError::InvalidGlobalMesgNum.into());
        }

        let count = rd.read_byte()?;
        let mut field_defs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let [num, size, base_code] = rd.take()?;
            field_defs.push(validate_field_def(global, num, size, base_code)?);
        }

        let dm = DefMsg {
            local,
            arch,
            global,
            field_defs,
        };

        if debug_log {
            debug!(
                "definition parsed: local {} | global {} | {:?} | {} fields",
                dm.local,
                dm.global,
                dm.arch,
                dm.field_defs.len(),
            );
        }

        Ok(dm)
    }
}

/// A field definition rejected by the profile rules.
#[derive(Debug, Error)]
#[error("validating message {mesg_num} field {field_num} failed: {kind}")]
pub struct ValidationError {
    /// The global message number the definition was for.
    pub mesg_num: u16,
    /// The field definition number.
    pub field_num: u8,
    /// The rule the definition broke.
    pub kind: ValidationErrorKind,
}

/// The specific rule a field definition broke.
#[derive(Debug, Error)]
pub enum ValidationErrorKind {
    #[error("unknown base type {0:#04x}")]
    UnknownBaseType(u8),
    #[error("base type is string, but the profile lists {profile}, not compatible")]
    StringIncompatible { profile: BaseType },
    #[error("size ({size}) is less than base type {base_type} size ({base_size})")]
    SizeBelowBaseType {
        size: u8,
        base_type: BaseType,
        base_size: usize,
    },
    #[error("size ({size}) is greater than size of profile base type {profile} ({profile_size})")]
    SizeAboveProfile {
        size: u8,
        profile: BaseType,
        profile_size: usize,
    },
    #[error("type {declared} is not compatible with profile type {profile}")]
    IncompatibleTypes {
        declared: BaseType,
        profile: BaseType,
    },
    #[error("is array, but size ({size}) is not a multiple of base type {base_type} size ({base_size})")]
    NotAMultiple {
        size: u8,
        base_type: BaseType,
        base_size: usize,
    },
    #[error(
        "is array, but definition base type {declared} (size {declared_size}) and profile base \
         type {profile} (size {profile_size}) differ"
    )]
    ArrayTypeMismatch {
        declared: BaseType,
        declared_size: usize,
        profile: BaseType,
        profile_size: usize,
    },
}

/// Check a raw field definition against the profile.
///
/// Fields and messages outside the profile pass freely; the profile rules
/// only bind where metadata exists to bind them to. For profile fields, a
/// declared size below the profile's is allowed (dynamic sub-fields arrive
/// narrower) but the declared type must coerce safely into the stored one.
fn validate_field_def(
    mesg_num: u16,
    field_num: u8,
    size: u8,
    base_code: u8,
) -> Result<FieldDef, ValidationError> {
    let fail = |kind| ValidationError {
        mesg_num,
        field_num,
        kind,
    };

    let base_type = BaseType::from_code(base_code)
        .ok_or_else(|| fail(ValidationErrorKind::UnknownBaseType(base_code)))?;

    let ok = FieldDef {
        num: field_num,
        size,
        base_type,
    };

    let pfield = if profile::known(mesg_num) {
        profile::field(mesg_num, field_num)
    } else {
        None
    };

    if base_type == BaseType::String {
        return match pfield {
            None => Ok(ok),
            Some(p) if p.base_type == BaseType::String => Ok(ok),
            Some(p) => Err(fail(ValidationErrorKind::StringIncompatible {
                profile: p.base_type,
            })),
        };
    }

    if (size as usize) < base_type.size() {
        return Err(fail(ValidationErrorKind::SizeBelowBaseType {
            size,
            base_type,
            base_size: base_type.size(),
        }));
    }

    let Some(pfield) = pfield else {
        return Ok(ok);
    };

    if !pfield.array {
        if size as usize > pfield.base_type.size() {
            return Err(fail(ValidationErrorKind::SizeAboveProfile {
                size,
                profile: pfield.base_type,
                profile_size: pfield.base_type.size(),
            }));
        }

        // Equal or narrower: only types whose values land safely in the
        // stored field may substitute for the profile type.
        if base_type != pfield.base_type
            && (base_type.signed() != pfield.base_type.signed()
                || pfield.base_type == BaseType::String)
        {
            return Err(fail(ValidationErrorKind::IncompatibleTypes {
                declared: base_type,
                profile: pfield.base_type,
            }));
        }

        return Ok(ok);
    }

    if size as usize % base_type.size() != 0 {
        return Err(fail(ValidationErrorKind::NotAMultiple {
            size,
            base_type,
            base_size: base_type.size(),
        }));
    }

    // Arrays allow no substitution at all.
    if base_type != pfield.base_type {
        return Err(fail(ValidationErrorKind::ArrayTypeMismatch {
            declared: base_type,
            declared_size: base_type.size(),
            profile: pfield.base_type,
            profile_size: pfield.base_type.size(),
        }));
    }

    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::messages::{HRV, RECORD};

    #[test]
    fn unknown_message_and_field_pass() {
        assert!(validate_field_def(12345, 0, 4, 0x86).is_ok());
        assert!(validate_field_def(RECORD, 200, 1, 0x02).is_ok());
    }

    #[test]
    fn unknown_base_type() {
        let err = validate_field_def(RECORD, 3, 1, 0x55).unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::UnknownBaseType(0x55)));
        assert_eq!(err.mesg_num, RECORD);
        assert_eq!(err.field_num, 3);
    }

    #[test]
    fn string_against_non_string_profile_field() {
        // record.heart_rate is a uint8.
        let err = validate_field_def(RECORD, 3, 4, 0x07).unwrap_err();
        assert!(matches!(
            err.kind,
            ValidationErrorKind::StringIncompatible {
                profile: BaseType::Uint8,
            }
        ));
    }

    #[test]
    fn size_below_declared_base_type() {
        let err = validate_field_def(RECORD, 5, 2, 0x86).unwrap_err();
        assert!(matches!(
            err.kind,
            ValidationErrorKind::SizeBelowBaseType { size: 2, .. }
        ));
    }

    #[test]
    fn size_above_profile_base_type() {
        // record.heart_rate is one byte in the profile.
        let err = validate_field_def(RECORD, 3, 2, 0x84).unwrap_err();
        assert!(matches!(
            err.kind,
            ValidationErrorKind::SizeAboveProfile {
                size: 2,
                profile: BaseType::Uint8,
                profile_size: 1,
            }
        ));
    }

    #[test]
    fn narrower_substitution_requires_matching_signedness() {
        // record.speed is a uint16; a narrower uint8 may stand in for it.
        assert!(validate_field_def(RECORD, 6, 1, 0x02).is_ok());

        // A sint8 may not.
        let err = validate_field_def(RECORD, 6, 1, 0x01).unwrap_err();
        assert!(matches!(
            err.kind,
            ValidationErrorKind::IncompatibleTypes {
                declared: BaseType::Sint8,
                profile: BaseType::Uint16,
            }
        ));
    }

    #[test]
    fn array_size_must_be_a_multiple() {
        // hrv.time is a uint16 array.
        let err = validate_field_def(HRV, 0, 3, 0x84).unwrap_err();
        assert!(matches!(
            err.kind,
            ValidationErrorKind::NotAMultiple { size: 3, .. }
        ));
    }

    #[test]
    fn array_base_type_must_match_exactly() {
        let err = validate_field_def(HRV, 0, 2, 0x02).unwrap_err();
        assert!(matches!(
            err.kind,
            ValidationErrorKind::ArrayTypeMismatch {
                declared: BaseType::Uint8,
                declared_size: 1,
                profile: BaseType::Uint16,
                profile_size: 2,
            }
        ));
    }

    #[test]
    fn exact_profile_match_passes() {
        assert!(validate_field_def(HRV, 0, 6, 0x84).is_ok());
        assert!(validate_field_def(RECORD, 253, 4, 0x86).is_ok());
    }
}
