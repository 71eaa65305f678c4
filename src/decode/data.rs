//! Data messages: field parsing, widening, and timestamp handling.

use std::io::Read;

use chrono::{DateTime, FixedOffset, Utc};
use log::warn;

use crate::file::UnknownField;
use crate::profile::{self, BaseType, FieldInfo, FieldKind, Latitude, Longitude, Message, Value};

use super::definition::{Arch, DefMsg, FieldDef};
use super::{Decoder, Error, FormatError};

/// The field number every timestamped message carries its timestamp under.
const TIMESTAMP_FIELD_NUM: u8 = 253;

/// Mask of the five-bit time offset in compressed timestamp headers.
const COMPRESSED_TIME_MASK: u8 = 0x1F;

/// The FIT epoch, 1989-12-31T00:00:00Z, in Unix seconds.
const FIT_EPOCH: i64 = 631_065_600;

/// Convert seconds since the FIT epoch to a UTC moment.
fn decode_date_time(seconds: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(FIT_EPOCH + i64::from(seconds), 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Partition a string-array payload on its NUL terminators.
///
/// Consecutive terminators end the list without emitting an empty string,
/// and an unterminated trailing run is still emitted.
fn split_strings(buf: &[u8]) -> Vec<String> {
    let mut strings = Vec::new();
    let mut start = 0;

    while start < buf.len() {
        match buf[start..].iter().position(|&b| b == 0x00) {
            Some(0) => break,
            Some(k) => {
                strings.push(String::from_utf8_lossy(&buf[start..start + k]).into_owned());
                start += k + 1;
            }
            None => {
                strings.push(String::from_utf8_lossy(&buf[start..]).into_owned());
                break;
            }
        }
    }

    strings
}

impl<R: Read> Decoder<R> {
    /// Decode the data record registered under a local slot.
    pub(super) fn decode_data_message(
        &mut self,
        local: u8,
        time_offset: Option<u8>,
    ) -> Result<Option<Message>, Error> {
        let Some(dm) = self.defs[local as usize].take() else {
            return Err(FormatError::MissingDefinition(local).into());
        };

        let result = self.parse_data_message(&dm, time_offset);
        self.defs[local as usize] = Some(dm);

        result
    }

    fn parse_data_message(
        &mut self,
        dm: &DefMsg,
        time_offset: Option<u8>,
    ) -> Result<Option<Message>, Error> {
        let mut msg = Message::new(dm.global);
        if msg.is_none() {
            *self.unknown_messages.entry(dm.global).or_insert(0) += 1;
        }

        if let Some(offset) = time_offset {
            self.apply_time_offset(dm, offset, msg.as_mut());
        }

        self.parse_data_fields(dm, msg.as_mut())?;

        Ok(msg)
    }

    /// Advance the running reference time by a compressed header's offset
    /// and stamp the message, if it has a timestamp field.
    ///
    /// The five-bit offset replaces the low bits of the reference; the
    /// wrapped difference from the previous offset carries any rollover
    /// into the high bits.
    fn apply_time_offset(&mut self, dm: &DefMsg, offset: u8, msg: Option<&mut Message>) {
        let Some(reference) = self.timestamp else {
            warn!(
                "compressed timestamp header without a previous reference time, \
                 skipping setting timestamp for message"
            );
            return;
        };

        let delta = offset.wrapping_sub(self.last_time_offset) & COMPRESSED_TIME_MASK;
        let timestamp = reference.wrapping_add(u32::from(delta));

        self.timestamp = Some(timestamp);
        self.last_time_offset = offset;

        if let Some(msg) = msg {
            if profile::field(dm.global, TIMESTAMP_FIELD_NUM).is_some() {
                msg.set_field(
                    TIMESTAMP_FIELD_NUM,
                    Value::Time(decode_date_time(timestamp)),
                );
            }
        }
    }

    fn parse_data_fields(
        &mut self,
        dm: &DefMsg,
        mut msg: Option<&mut Message>,
    ) -> Result<(), Error> {
        for fd in &dm.field_defs {
            let dsize = fd.size as usize;
            let pfield = profile::field(dm.global, fd.num);

            let mut padding = 0;
            match pfield {
                Some(p) if p.base_type != BaseType::String && !p.array => {
                    padding = p.base_type.size().saturating_sub(dsize);
                }
                Some(_) => {}
                None => {
                    let key = UnknownField {
                        mesg_num: dm.global,
                        field_num: fd.num,
                    };
                    *self.unknown_fields.entry(key).or_insert(0) += 1;
                }
            }

            self.rd.read_full(&mut self.tmp[..dsize])?;

            // Widen a dynamic sub-field to the width the profile stores,
            // preserving the numeric value.
            let width = dsize + padding;
            if padding > 0 {
                match dm.arch {
                    Arch::Little => self.tmp[dsize..width].fill(0),
                    Arch::Big => {
                        for j in (0..dsize).rev() {
                            self.tmp[j + padding] = self.tmp[j];
                        }
                        self.tmp[..padding].fill(0);
                    }
                }
            }

            let (Some(msg), Some(pfield)) = (msg.as_deref_mut(), pfield) else {
                continue;
            };

            if let Some(value) = self.decode_field_value(dm.arch, fd, pfield, dsize, width) {
                msg.set_field(fd.num, value);
            }
        }

        Ok(())
    }

    /// Decode the bytes of one field into a typed value, or `None` for
    /// values that leave the field at its invalid marker.
    fn decode_field_value(
        &mut self,
        arch: Arch,
        fd: &FieldDef,
        pfield: &FieldInfo,
        dsize: usize,
        width: usize,
    ) -> Option<Value> {
        let buf = &self.tmp[..width];

        // The wire bytes proper, before any widening.
        let wire = match arch {
            Arch::Little => &buf[..dsize],
            Arch::Big => &buf[width - dsize..],
        };

        match pfield.kind {
            FieldKind::Fit if !pfield.array => match fd.base_type {
                BaseType::Enum
                | BaseType::Uint8
                | BaseType::Uint8z
                | BaseType::Byte
                | BaseType::Uint16
                | BaseType::Uint16z
                | BaseType::Uint32
                | BaseType::Uint32z => Some(Value::Uint(arch.read_uint(buf))),
                BaseType::Sint8 | BaseType::Sint16 | BaseType::Sint32 => {
                    Some(Value::Int(arch.read_int(wire)))
                }
                BaseType::Float32 => Some(Value::Float(f64::from(arch.read_f32(wire)))),
                BaseType::Float64 => Some(Value::Float(arch.read_f64(wire))),
                BaseType::String => {
                    let end = wire.iter().position(|&b| b == 0x00).unwrap_or(wire.len());
                    if end > 0 {
                        Some(Value::Str(String::from_utf8_lossy(&wire[..end]).into_owned()))
                    } else {
                        None
                    }
                }
            },
            FieldKind::Fit => match fd.base_type {
                BaseType::Byte => Some(Value::Bytes(wire.to_vec())),
                BaseType::String => {
                    if wire.is_empty() {
                        None
                    } else {
                        Some(Value::StrArray(split_strings(wire)))
                    }
                }
                BaseType::Enum | BaseType::Uint8 | BaseType::Uint8z => {
                    Some(Value::UintArray(wire.iter().map(|&b| u64::from(b)).collect()))
                }
                BaseType::Sint8 => Some(Value::IntArray(
                    wire.iter().map(|&b| i64::from(b as i8)).collect(),
                )),
                BaseType::Uint16 | BaseType::Uint16z | BaseType::Uint32 | BaseType::Uint32z => {
                    Some(Value::UintArray(
                        wire.chunks_exact(fd.base_type.size())
                            .map(|c| arch.read_uint(c))
                            .collect(),
                    ))
                }
                BaseType::Sint16 | BaseType::Sint32 => Some(Value::IntArray(
                    wire.chunks_exact(fd.base_type.size())
                        .map(|c| arch.read_int(c))
                        .collect(),
                )),
                BaseType::Float32 => Some(Value::FloatArray(
                    wire.chunks_exact(4)
                        .map(|c| f64::from(arch.read_f32(c)))
                        .collect(),
                )),
                BaseType::Float64 => Some(Value::FloatArray(
                    wire.chunks_exact(8).map(|c| arch.read_f64(c)).collect(),
                )),
            },
            FieldKind::TimeUtc => {
                let seconds = arch.read_uint(buf) as u32;
                if seconds == u32::MAX {
                    return None;
                }

                self.timestamp = Some(seconds);
                self.last_time_offset = (seconds as u8) & COMPRESSED_TIME_MASK;

                Some(Value::Time(decode_date_time(seconds)))
            }
            FieldKind::TimeLocal => {
                let seconds = arch.read_uint(buf) as u32;
                if seconds == u32::MAX {
                    return None;
                }

                // Only the offset from the last UTC reference is known; a
                // fixed-offset zone stands in for the real local timezone.
                let utc = decode_date_time(self.timestamp.unwrap_or(0));
                let local = decode_date_time(seconds);
                let offset = (local - utc).num_seconds();

                match i32::try_from(offset).ok().and_then(FixedOffset::east_opt) {
                    Some(zone) => Some(Value::LocalTime(utc.with_timezone(&zone))),
                    None => {
                        warn!("local timestamp offset of {offset}s has no representable zone");
                        None
                    }
                }
            }
            FieldKind::Lat => Some(Value::Lat(Latitude::from_semicircles(
                arch.read_int(wire) as i32,
            ))),
            FieldKind::Lng => Some(Value::Lng(Longitude::from_semicircles(
                arch.read_int(wire) as i32,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_terminators() {
        assert_eq!(split_strings(b"abc\x00de\x00"), ["abc", "de"]);
    }

    #[test]
    fn unterminated_tail_is_emitted() {
        assert_eq!(split_strings(b"abc\x00de"), ["abc", "de"]);
    }

    #[test]
    fn consecutive_terminators_end_the_list() {
        assert_eq!(split_strings(b"abc\x00\x00de\x00"), ["abc"]);
        assert!(split_strings(b"\x00abc").is_empty());
        assert!(split_strings(b"").is_empty());
    }

    #[test]
    fn epoch_conversion() {
        assert_eq!(
            decode_date_time(0),
            DateTime::parse_from_rfc3339("1989-12-31T00:00:00Z").unwrap()
        );
        assert_eq!(
            decode_date_time(86_400 + 60),
            DateTime::parse_from_rfc3339("1990-01-01T00:01:00Z").unwrap()
        );
    }
}
