//! ZIP format structures.
//!
//! This module contains the low-level records for parsing ZIP archives: the
//! end-of-central-directory trailer, the central directory file header, and
//! the local file header. Each record's 4-byte signature is read separately
//! from the fixed prefix, and the variable-length tails (name, extra,
//! comment) are read by the caller in that order.
//!
//! The codecs here do not validate signatures; the archive reader checks
//! them at the positions where each record is expected.

pub mod central_dir;
mod eocd;
mod local;

pub use central_dir::CentralDirectoryHeader;
pub use eocd::EocdRecord;
pub use local::LocalFileHeader;

use std::fmt;
use std::io::{self, Read};

use crate::{Error, Result};

/// General purpose flag bit 3: sizes and CRC follow the payload in a data
/// descriptor instead of being stored in the local header.
pub const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

/// Compression methods supported by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CompressionMethod {
    /// No compression (stored).
    Store = 0,
    /// DEFLATE compression.
    Deflate = 8,
}

impl TryFrom<u16> for CompressionMethod {
    type Error = u16;

    fn try_from(value: u16) -> std::result::Result<Self, u16> {
        match value {
            0 => Ok(Self::Store),
            8 => Ok(Self::Deflate),
            other => Err(other),
        }
    }
}

/// Which record a codec was reading when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// End of central directory record.
    Eocd,
    /// Central directory file header.
    CentralHeader,
    /// Local file header.
    LocalHeader,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Eocd => "end of central directory",
            Self::CentralHeader => "central directory header",
            Self::LocalHeader => "local file header",
        };
        f.write_str(name)
    }
}

/// Read a record's 4-byte little-endian signature.
pub(crate) fn read_signature<R: Read>(reader: &mut R, kind: RecordKind) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_prefix(reader, &mut buf, kind)?;
    Ok(u32::from_le_bytes(buf))
}

/// Fill `buf` from the source, mapping a short read to `TruncatedHeader`.
pub(crate) fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8], kind: RecordKind) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(Error::TruncatedHeader(kind)),
        Err(e) => Err(Error::Source(e)),
    }
}

/// Read a variable-length record tail into an owned buffer.
pub(crate) fn read_tail<R: Read>(reader: &mut R, len: usize, kind: RecordKind) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| Error::OutOfMemory)?;
    buf.resize(len, 0);
    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(buf),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(Error::TruncatedTail(kind)),
        Err(e) => Err(Error::Source(e)),
    }
}

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use super::*;

    #[test]
    fn test_record_sizes_match_wire_format() {
        assert_eq!(size_of::<EocdRecord>(), EocdRecord::SIZE);
        assert_eq!(size_of::<CentralDirectoryHeader>(), CentralDirectoryHeader::SIZE);
        assert_eq!(size_of::<LocalFileHeader>(), LocalFileHeader::SIZE);
    }

    #[test]
    fn test_compression_method_conversion() {
        assert_eq!(CompressionMethod::try_from(0), Ok(CompressionMethod::Store));
        assert_eq!(CompressionMethod::try_from(8), Ok(CompressionMethod::Deflate));
        assert_eq!(CompressionMethod::try_from(12), Err(12));
        assert_eq!(CompressionMethod::try_from(99), Err(99));
    }

    #[test]
    fn test_signatures_match_magic_bytes() {
        assert_eq!(u32::from_le_bytes(EocdRecord::MAGIC), EocdRecord::SIGNATURE);
        assert_eq!(
            u32::from_le_bytes(CentralDirectoryHeader::MAGIC),
            CentralDirectoryHeader::SIGNATURE
        );
        assert_eq!(
            u32::from_le_bytes(LocalFileHeader::MAGIC),
            LocalFileHeader::SIGNATURE
        );
    }

    #[test]
    fn test_read_tail_short_source() {
        let data = [0u8; 3];
        let err = read_tail(&mut &data[..], 8, RecordKind::CentralHeader).unwrap_err();
        assert!(matches!(err, Error::TruncatedTail(RecordKind::CentralHeader)));
    }

    #[test]
    fn test_read_tail_empty() {
        let data: [u8; 0] = [];
        let tail = read_tail(&mut &data[..], 0, RecordKind::Eocd).unwrap();
        assert!(tail.is_empty());
    }
}
