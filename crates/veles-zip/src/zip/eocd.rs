//! End of Central Directory (EOCD) structures.

use std::io::Read;

use veles_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::{read_prefix, RecordKind};
use crate::Result;

/// End of Central Directory Record (without signature).
///
/// This is the standard ZIP EOCD record found at the end of the archive,
/// possibly followed by a trailing comment of up to 65535 bytes. The 4-byte
/// signature (0x06054b50) is read separately before this struct. ZIP64
/// archives mark some fields with 0xFFFF or 0xFFFFFFFF sentinels; see
/// [`EocdRecord::is_zip64`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct EocdRecord {
    /// Number of this disk
    pub disk_number: u16,
    /// Disk where central directory starts
    pub central_dir_disk: u16,
    /// Number of central directory records on this disk
    pub central_dir_count_disk: u16,
    /// Total number of central directory records
    pub central_dir_count_total: u16,
    /// Size of central directory (bytes)
    pub central_dir_size: u32,
    /// Offset of start of central directory
    pub central_dir_offset: u32,
    /// Comment length
    pub comment_length: u16,
}

impl EocdRecord {
    /// EOCD signature bytes.
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];

    /// EOCD signature as u32.
    pub const SIGNATURE: u32 = 0x06054b50;

    /// Fixed record size following the signature.
    pub const SIZE: usize = 18;

    /// Smallest possible archive: signature plus fixed record, no comment.
    pub const MIN_ARCHIVE_SIZE: u64 = 4 + Self::SIZE as u64;

    /// Decode the fixed record from the source, signature already consumed.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        read_prefix(reader, &mut buf, RecordKind::Eocd)?;
        let mut decoder = BinaryReader::new(&buf);
        Ok(decoder.read_struct()?)
    }

    /// Check if this archive uses ZIP64 extensions.
    ///
    /// Returns true if any of the fields contain sentinel values
    /// indicating ZIP64 format.
    pub fn is_zip64(&self) -> bool {
        self.central_dir_count_total == 0xFFFF
            || self.central_dir_offset == 0xFFFFFFFF
            || self.central_dir_size == 0xFFFFFFFF
    }
}
