//! The decoding pipeline.
//!
//! A document is a self-describing stream: definition records announce the
//! shape of the data records that follow, keyed by a four-bit local slot.
//! The decoder drives a reader through the header, the record region, and
//! the trailing checksum, folding every byte into a running CRC along the
//! way, and publishes decoded messages into the document's file-type
//! container.
//!
//! Four entry points cover the common depths of inspection:
//!
//! - [`decode_header`] stops after the header.
//! - [`decode_header_and_file_id`] also reads the mandatory leading FileId
//!   message.
//! - [`decode`] processes the whole document into a [`Fit`].
//! - [`check_integrity`] verifies checksums without decoding records.
//!
//! Setting the `GOFIT_DEBUG` environment variable to a truthy value at
//! decoder construction enables diagnostic records on the `log` facade.

pub mod check;
pub mod header;

mod data;
mod definition;
mod reader;

use std::collections::BTreeMap;
use std::env;
use std::io::{BufReader, Read};

use log::debug;
use thiserror::Error as ThisError;

use crate::file::{File, Fit, UnknownField};
use crate::profile::messages::{FileIdMsg, FILE_ID};
use crate::profile::Message;

use definition::DefMsg;
use header::{classify, Header, RecordKind};
use reader::RecordReader;

pub use definition::{ValidationError, ValidationErrorKind};

/// An error decoding a document.
///
/// Every error is fatal to the decode in progress; unknown messages and
/// unknown fields are counted in the returned [`Fit`] instead of failing.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The stream violates the FIT format.
    #[error("format: {0}")]
    Format(#[from] FormatError),
    /// A checksum did not verify.
    #[error("integrity: {0}")]
    Integrity(#[from] IntegrityError),
    /// The stream uses a capability this decoder does not support.
    #[error("not supported: {0}")]
    NotSupported(#[from] NotSupportedError),
    /// A field definition failed the profile rules.
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),
    /// The stream ended inside a structure.
    #[error("unexpected end of file")]
    UnexpectedEof,
    /// The underlying source failed.
    #[error(transparent)]
    Io(std::io::Error),
}

/// A violation of the FIT format.
#[derive(Debug, ThisError)]
pub enum FormatError {
    #[error("incorrect file type marker")]
    NotFitData,
    #[error("unknown header length ({0})")]
    UnknownHeaderLength(u8),
    #[error("unknown architecture ({0:#04x})")]
    UnknownArchitecture(u8),
    #[error("global message number was set invalid")]
    InvalidGlobalMesgNum,
    #[error("missing definition message for local message number {0}")]
    MissingDefinition(u8),
    #[error("expected a definition record header, got {0:#010b}")]
    ExpectedDefinition(u8),
    #[error("expected a data record header, got {0:#010b}")]
    ExpectedData(u8),
    #[error("first definition message was not for file_id")]
    FirstDefinitionNotFileId,
    #[error("first data message was not a file_id")]
    FirstMessageNotFileId,
    #[error("file type was set invalid")]
    InvalidFileType,
    #[error("unknown file type ({0})")]
    UnknownFileType(u8),
    #[error("data region ended after {read} bytes, header declared {declared}")]
    DataSizeMismatch { read: u32, declared: u32 },
}

/// A checksum failure.
#[derive(Debug, ThisError)]
pub enum IntegrityError {
    #[error("header checksum failed: calculated {calculated:#06x}, found {found:#06x}")]
    HeaderChecksum { found: u16, calculated: u16 },
    #[error("file checksum failed")]
    FileChecksum,
}

/// A capability outside this decoder's support.
#[derive(Debug, ThisError)]
pub enum NotSupportedError {
    #[error("manufacturer specific file type ({0})")]
    ManufacturerFileType(u8),
    #[error("developer data fields")]
    DeveloperData,
}

/// The largest field a definition can declare; sizes are a single byte.
const MAX_FIELD_SIZE: usize = 255;

/// Number of local slots definition messages can register under.
const MAX_LOCAL_MESGS: usize = 16;

/// Running state of one decode call.
struct Decoder<R> {
    rd: RecordReader<R>,
    tmp: [u8; MAX_FIELD_SIZE],
    defs: [Option<DefMsg>; MAX_LOCAL_MESGS],
    /// Reference time for compressed timestamp headers, in seconds since
    /// the FIT epoch.
    timestamp: Option<u32>,
    /// The five-bit offset the reference time was last advanced to.
    last_time_offset: u8,
    unknown_messages: BTreeMap<u16, usize>,
    unknown_fields: BTreeMap<UnknownField, usize>,
    debug: bool,
}

impl<R: Read> Decoder<R> {
    fn new(r: R) -> Decoder<R> {
        Decoder {
            rd: RecordReader::new(r),
            tmp: [0; MAX_FIELD_SIZE],
            defs: Default::default(),
            timestamp: None,
            last_time_offset: 0,
            unknown_messages: BTreeMap::new(),
            unknown_fields: BTreeMap::new(),
            debug: debug_enabled(),
        }
    }

    fn decode_header(&mut self) -> Result<Header, Error> {
        let header = Header::decode(&mut self.rd)?;

        // Byte accounting covers the data region only.
        self.rd.reset_count();

        if self.debug {
            debug!("header decoded: {header:?}");
        }

        Ok(header)
    }

    /// Parse the mandatory first definition and data records, which must
    /// both be for FileId.
    fn decode_file_id(&mut self) -> Result<FileIdMsg, Error> {
        let b = self.rd.read_byte()?;
        let RecordKind::Definition { local } = classify(b)? else {
            return Err(FormatError::ExpectedDefinition(b).into());
        };

        let dm = DefMsg::decode(&mut self.rd, local, self.debug)?;
        if dm.global != FILE_ID {
            return Err(FormatError::FirstDefinitionNotFileId.into());
        }
        let dm_local = dm.local as usize;
        self.defs[dm_local] = Some(dm);

        let b = self.rd.read_byte()?;
        let RecordKind::Data { local, time_offset } = classify(b)? else {
            return Err(FormatError::ExpectedData(b).into());
        };

        match self.decode_data_message(local, time_offset)? {
            Some(Message::FileId(m)) => Ok(m),
            _ => Err(FormatError::FirstMessageNotFileId.into()),
        }
    }

    /// Dispatch one record, returning its message if it decoded to a known
    /// one.
    fn decode_record(&mut self) -> Result<Option<Message>, Error> {
        let b = self.rd.read_byte()?;

        match classify(b)? {
            RecordKind::Definition { local } => {
                let dm = DefMsg::decode(&mut self.rd, local, self.debug)?;
                self.defs[local as usize] = Some(dm);

                Ok(None)
            }
            RecordKind::Data { local, time_offset } => {
                self.decode_data_message(local, time_offset)
            }
        }
    }

    /// Stream the data region through the checksum without decoding it.
    fn discard_data(&mut self, mut remaining: u32) -> Result<(), Error> {
        while remaining > 0 {
            let n = (remaining as usize).min(MAX_FIELD_SIZE);
            self.rd.read_full(&mut self.tmp[..n])?;
            remaining -= n as u32;
        }

        Ok(())
    }

    /// Read the trailing checksum; folding it in must zero the running CRC.
    fn read_trailing_crc(&mut self) -> Result<u16, Error> {
        let crc = u16::from_le_bytes(self.rd.take()?);

        if self.rd.crc() != 0x0000 {
            return Err(IntegrityError::FileChecksum.into());
        }

        Ok(crc)
    }
}

/// Verify the checksums of a document without decoding its records.
///
/// With `header_only`, only the header and its checksum are examined.
pub fn check_integrity(r: impl Read, header_only: bool) -> Result<(), Error> {
    let mut d = Decoder::new(BufReader::new(r));
    let header = d.decode_header()?;

    if header_only {
        return Ok(());
    }

    d.discard_data(header.data_size)?;
    d.read_trailing_crc()?;

    Ok(())
}

/// Decode the header of a document without decoding the records.
pub fn decode_header(r: impl Read) -> Result<Header, Error> {
    Decoder::new(BufReader::new(r)).decode_header()
}

/// Decode the header and the mandatory FileId message of a document
/// without decoding the records that follow.
pub fn decode_header_and_file_id(r: impl Read) -> Result<(Header, FileIdMsg), Error> {
    let mut d = Decoder::new(BufReader::new(r));
    let header = d.decode_header()?;
    let file_id = d.decode_file_id()?;

    Ok((header, file_id))
}

/// Decode an entire document.
pub fn decode(r: impl Read) -> Result<Fit, Error> {
    let mut d = Decoder::new(BufReader::new(r));
    let header = d.decode_header()?;
    let file_id = d.decode_file_id()?;

    let mut file = File::with_type(file_id.file_type)?;

    while d.rd.bytes_read() < header.data_size {
        if let Some(msg) = d.decode_record()? {
            file.add(msg, d.debug);
        }
    }

    let read = d.rd.bytes_read();
    if read != header.data_size {
        return Err(FormatError::DataSizeMismatch {
            read,
            declared: header.data_size,
        }
        .into());
    }

    let crc = d.read_trailing_crc()?;

    Ok(Fit {
        header,
        crc,
        file_id,
        unknown_messages: d.unknown_messages,
        unknown_fields: d.unknown_fields,
        file,
    })
}

/// Whether the `GOFIT_DEBUG` environment variable asks for diagnostics.
///
/// Truthy spellings follow Go's `strconv.ParseBool`.
fn debug_enabled() -> bool {
    matches!(
        env::var("GOFIT_DEBUG").ok().as_deref(),
        Some("1" | "t" | "T" | "true" | "TRUE" | "True")
    )
}
