//! The file header and record headers.

use std::io::Read;

use tartan_bitfield::bitfield;
use zerocopy::FromBytes;

use super::reader::RecordReader;
use super::{check, Error, FormatError, IntegrityError, NotSupportedError};

/// The decoded file header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// Header length: 12, or 14 when a header checksum is present.
    pub size: u8,
    /// Protocol version the file was written under.
    pub protocol_version: u8,
    /// Profile version the file was written under.
    pub profile_version: u16,
    /// Number of bytes between the header and the trailing checksum.
    pub data_size: u32,
    /// The file type marker, `.FIT`.
    pub data_type: [u8; 4],
    /// The header checksum as stored; zero when absent or not computed.
    pub crc: u16,
}

impl Header {
    /// Decode the header from the front of a document.
    ///
    /// A stored, non-zero header checksum is verified against the twelve
    /// bytes preceding it; a stored zero means the writer skipped the
    /// computation and is accepted.
    pub(super) fn decode<R: Read>(rd: &mut RecordReader<R>) -> Result<Header, Error> {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct FileHeader {
            header_size: u8,
            protocol_version: u8,
            profile_version: u16,
            data_size: u32,
            data_type: [u8; 4],
        }

        let bytes: [u8; 12] = rd.take()?;

        let FileHeader {
            header_size,
            protocol_version,
            profile_version,
            data_size,
            data_type,
        } = zerocopy::transmute!(bytes);

        if &data_type != b".FIT" {
            return Err(FormatError::NotFitData.into());
        }

        let crc = match header_size {
            12 => 0,
            14 => {
                let found = u16::from_le_bytes(rd.take()?);
                let calculated = check::update(0, &bytes);

                if found != 0 && found != calculated {
                    return Err(IntegrityError::HeaderChecksum { found, calculated }.into());
                }

                found
            }
            _ => return Err(FormatError::UnknownHeaderLength(header_size).into()),
        };

        Ok(Header {
            size: header_size,
            protocol_version,
            profile_version: u16::from_le(profile_version),
            data_size: u32::from_le(data_size),
            data_type,
            crc,
        })
    }
}

/// The classified shape of one record header byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum RecordKind {
    /// A definition record follows.
    Definition { local: u8 },
    /// A data record follows; compressed-timestamp headers carry their
    /// five-bit time offset.
    Data { local: u8, time_offset: Option<u8> },
}

/// Classify a record header byte.
pub(super) fn classify(byte: u8) -> Result<RecordKind, Error> {
    bitfield! {
        struct RecordHeader(u8) {
            [7] is_compressed,
        }
    }

    if RecordHeader(byte).is_compressed() {
        bitfield! {
            struct CompressedHeader(u8) {
                [0..5] time_offset: u8,
                [5..7] local_message: u8,
            }
        }

        let header = CompressedHeader(byte);

        Ok(RecordKind::Data {
            local: header.local_message(),
            time_offset: Some(header.time_offset()),
        })
    } else {
        bitfield! {
            struct NormalHeader(u8) {
                [0..4] local_message: u8,
                [5] is_developer,
                [6] is_definition,
            }
        }

        let header = NormalHeader(byte);

        if header.is_developer() {
            return Err(NotSupportedError::DeveloperData.into());
        }

        let local = header.local_message();

        Ok(if header.is_definition() {
            RecordKind::Definition { local }
        } else {
            RecordKind::Data {
                local,
                time_offset: None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_definition() {
        assert_eq!(
            classify(0x4A).unwrap(),
            RecordKind::Definition { local: 10 }
        );
    }

    #[test]
    fn classify_data() {
        assert_eq!(
            classify(0x03).unwrap(),
            RecordKind::Data {
                local: 3,
                time_offset: None,
            }
        );
    }

    #[test]
    fn classify_compressed() {
        // Slot two, offset seventeen.
        assert_eq!(
            classify(0b1101_0001).unwrap(),
            RecordKind::Data {
                local: 2,
                time_offset: Some(17),
            }
        );
    }

    #[test]
    fn classify_rejects_developer_data() {
        assert!(matches!(
            classify(0x20),
            Err(Error::NotSupported(NotSupportedError::DeveloperData))
        ));
        assert!(matches!(
            classify(0x60),
            Err(Error::NotSupported(NotSupportedError::DeveloperData))
        ));
    }
}
