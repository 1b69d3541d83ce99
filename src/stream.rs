use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::Result;

/// The 12-byte signature that opens a supported file.
pub const SIGNATURE: [u8; 12] = [
    0xe9, 0x11, 0x00, 0xa8, 0x43, 0xa0, 0x41, 0x2d, 0x94, 0xb3, 0x06, 0xda,
];

/// Big-endian reader over a buffered byte stream.
///
/// Every read either yields the full width requested or fails with an
/// `UnexpectedEof` IO error.
pub struct ByteReader<R> {
    inner: R,
}

impl ByteReader<BufReader<File>> {
    /// Opens the file at `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> ByteReader<R> {
    /// Wraps a buffered reader.
    pub fn new(inner: R) -> Self {
        ByteReader { inner }
    }

    /// Unwraps this reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&mut self) -> Result<u8> {
        match self.inner.fill_buf()?.first() {
            Some(&byte) => Ok(byte),
            None => Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
        }
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian `u64`.
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Reads exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads exactly `n` bytes and decodes them as UTF-8.
    pub fn read_string(&mut self, n: usize) -> Result<String> {
        Ok(String::from_utf8(self.read_bytes(n)?)?)
    }

    /// Consumes the next 12 bytes and reports whether they are [`SIGNATURE`].
    pub fn is_signature_next(&mut self) -> Result<bool> {
        Ok(self.read_array::<12>()? == SIGNATURE)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }
}
