//! The byte source feeding the decoder.

use std::io::{ErrorKind, Read};

use super::check;
use super::Error;

/// A byte source layered over the running checksum.
///
/// Every byte handed to the decoder is also folded into the checksum
/// accumulator, and counted so the record loop can stop at the end of the
/// data region. The count starts over after the file header, leaving it a
/// measure of data-region bytes only.
pub(super) struct RecordReader<R> {
    r: R,
    n: u32,
    crc: u16,
}

impl<R: Read> RecordReader<R> {
    pub(super) fn new(r: R) -> RecordReader<R> {
        RecordReader { r, n: 0, crc: 0 }
    }

    /// Read a single byte.
    pub(super) fn read_byte(&mut self) -> Result<u8, Error> {
        Ok(self.take::<1>()?[0])
    }

    /// Fill `buf` exactly.
    pub(super) fn read_full(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.r.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::UnexpectedEof,
            _ => Error::Io(e),
        })?;

        self.n += buf.len() as u32;
        self.crc = check::update(self.crc, buf);

        Ok(())
    }

    /// Take an exact number of bytes.
    pub(super) fn take<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut buf = [0; N];
        self.read_full(&mut buf)?;

        Ok(buf)
    }

    /// Bytes read since the last counter reset.
    pub(super) fn bytes_read(&self) -> u32 {
        self.n
    }

    /// Restart the byte counter at the top of the data region.
    pub(super) fn reset_count(&mut self) {
        self.n = 0;
    }

    /// The running checksum over everything read so far.
    pub(super) fn crc(&self) -> u16 {
        self.crc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_checksums_reads() {
        let data = b"123456789";
        let mut rd = RecordReader::new(&data[..]);

        let head: [u8; 4] = rd.take().unwrap();
        assert_eq!(&head, b"1234");
        assert_eq!(rd.bytes_read(), 4);

        let mut tail = [0; 5];
        rd.read_full(&mut tail).unwrap();
        assert_eq!(rd.bytes_read(), 9);
        assert_eq!(rd.crc(), check::update(0, data));
    }

    #[test]
    fn reset_keeps_checksum() {
        let mut rd = RecordReader::new(&b"abcd"[..]);
        rd.take::<2>().unwrap();
        rd.reset_count();

        assert_eq!(rd.bytes_read(), 0);
        assert_eq!(rd.crc(), check::update(0, b"ab"));
    }

    #[test]
    fn short_read_is_unexpected_eof() {
        let mut rd = RecordReader::new(&b"ab"[..]);

        assert!(matches!(rd.take::<4>(), Err(Error::UnexpectedEof)));
    }
}
