//! Local File Header structures.

use std::io::Read;

use veles_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::{read_prefix, RecordKind};
use crate::Result;

/// Local File Header (without signature).
///
/// This structure precedes each member's payload in the archive. Its name
/// and extra lengths may legitimately differ from the central directory's,
/// so the reader skips the payload using these values rather than the
/// central ones.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LocalFileHeader {
    /// Version needed to extract
    pub version_needed: u16,
    /// General purpose bit flag
    pub flags: u16,
    /// Compression method
    pub compression_method: u16,
    /// File last modification time (DOS format)
    pub last_mod_time: u16,
    /// File last modification date (DOS format)
    pub last_mod_date: u16,
    /// CRC-32 of uncompressed data
    pub crc32: u32,
    /// Compressed size
    pub compressed_size: u32,
    /// Uncompressed size
    pub uncompressed_size: u32,
    /// File name length
    pub file_name_length: u16,
    /// Extra field length
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    /// Local File Header signature bytes.
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

    /// Local File Header signature as u32.
    pub const SIGNATURE: u32 = 0x04034b50;

    /// Fixed record size following the signature.
    pub const SIZE: usize = 26;

    /// Decode the fixed record from the source, signature already consumed.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        read_prefix(reader, &mut buf, RecordKind::LocalHeader)?;
        let mut decoder = BinaryReader::new(&buf);
        Ok(decoder.read_struct()?)
    }

    /// Total variable-length data size following this header.
    pub fn variable_data_size(&self) -> usize {
        self.file_name_length as usize + self.extra_field_length as usize
    }
}
