//! Archive member descriptors and the member read pipeline.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::datetime::DosDateTime;
use crate::decompress;
use crate::zip::{self, CentralDirectoryHeader, CompressionMethod, LocalFileHeader, RecordKind};
use crate::{Error, Result};

/// Operating system that wrote an entry, from the made-by version field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MadeByOs {
    /// MS-DOS and OS/2 (FAT-family attributes).
    Dos,
    /// Unix.
    Unix,
    /// Any other host system code.
    Unknown(u8),
}

impl From<u8> for MadeByOs {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Dos,
            3 => Self::Unix,
            other => Self::Unknown(other),
        }
    }
}

/// Deflate effort level recorded in the general purpose flags.
///
/// Informational only; the payload decodes the same way regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeflateLevel {
    /// Normal compression.
    Normal,
    /// Maximum compression.
    Maximum,
    /// Fast compression.
    Fast,
    /// Super fast compression.
    SuperFast,
}

impl DeflateLevel {
    fn from_flags(flags: u16) -> Self {
        match (flags >> 1) & 0b11 {
            0 => Self::Normal,
            1 => Self::Maximum,
            2 => Self::Fast,
            _ => Self::SuperFast,
        }
    }
}

/// An entry (member) within a ZIP archive.
///
/// This contains metadata about the member, not the member data itself.
/// Use [`ZipEntry::decompress_into`] or the archive's read methods to get
/// the actual contents.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    /// Member name/path within the archive.
    name: String,
    /// Member comment bytes, verbatim.
    comment: Vec<u8>,
    /// Extra field bytes, verbatim.
    extra: Vec<u8>,
    /// Compressed size in bytes.
    compressed_size: u64,
    /// Uncompressed size in bytes.
    uncompressed_size: u64,
    /// CRC-32 of the uncompressed data.
    crc32: u32,
    /// Compression method used.
    compression_method: CompressionMethod,
    /// Decoded modification timestamp.
    modified: DosDateTime,
    /// Host system that wrote the entry.
    made_by_os: MadeByOs,
    /// Low byte of the made-by version field.
    made_by_version: u8,
    /// Raw external attributes.
    external_attrs: u32,
    /// Offset of the local file header in the archive.
    local_header_offset: u64,
    /// Offset of this entry's central directory header.
    central_header_offset: u64,
    /// Whether the external attributes mark a directory.
    is_dir: bool,
    /// Deflate effort level, for deflated entries.
    deflate_level: Option<DeflateLevel>,
}

impl ZipEntry {
    /// Build an entry from a decoded central directory header and its tails.
    pub(crate) fn from_central(
        header: CentralDirectoryHeader,
        name: Vec<u8>,
        extra: Vec<u8>,
        comment: Vec<u8>,
        central_header_offset: u64,
    ) -> Result<Self> {
        let flags = header.flags;
        let method = header.compression_method;
        let compressed_size = header.compressed_size;
        let uncompressed_size = header.uncompressed_size;

        let compression_method =
            CompressionMethod::try_from(method).map_err(Error::UnsupportedCompression)?;

        // Entries written with a data descriptor leave the central sizes
        // at zero until the descriptor is seen; we never read descriptors.
        if flags & zip::FLAG_DATA_DESCRIPTOR != 0
            && compressed_size == 0
            && uncompressed_size == 0
        {
            return Err(Error::DataDescriptorUnsupported);
        }

        let modified = DosDateTime::from_dos(header.last_mod_time, header.last_mod_date)?;
        let external_attrs = header.external_attrs;

        let deflate_level = match compression_method {
            CompressionMethod::Deflate => Some(DeflateLevel::from_flags(flags)),
            CompressionMethod::Store => None,
        };

        Ok(Self {
            name: String::from_utf8_lossy(&name).into_owned(),
            comment,
            extra,
            compressed_size: compressed_size as u64,
            uncompressed_size: uncompressed_size as u64,
            crc32: header.crc32,
            compression_method,
            modified,
            made_by_os: MadeByOs::from((header.version_made_by >> 8) as u8),
            made_by_version: header.version_made_by as u8,
            external_attrs,
            local_header_offset: header.local_header_offset as u64,
            central_header_offset,
            is_dir: external_attrs & 0x10 != 0,
            deflate_level,
        })
    }

    /// Get the member name/path.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the member comment bytes.
    #[inline]
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    /// Get the extra field bytes.
    #[inline]
    pub fn extra(&self) -> &[u8] {
        &self.extra
    }

    /// Get the compressed size in bytes.
    #[inline]
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    /// Get the uncompressed size in bytes.
    #[inline]
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Get the CRC-32 of the uncompressed data.
    #[inline]
    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// Get the compression method.
    #[inline]
    pub fn compression_method(&self) -> CompressionMethod {
        self.compression_method
    }

    /// Get the decoded modification timestamp.
    #[inline]
    pub fn modified(&self) -> DosDateTime {
        self.modified
    }

    /// Get the host system that wrote the entry.
    #[inline]
    pub fn made_by_os(&self) -> MadeByOs {
        self.made_by_os
    }

    /// Get the low byte of the made-by version field.
    #[inline]
    pub fn made_by_version(&self) -> u8 {
        self.made_by_version
    }

    /// Get the raw external attributes.
    #[inline]
    pub fn external_attrs(&self) -> u32 {
        self.external_attrs
    }

    /// Get the offset of the local file header.
    #[inline]
    pub fn local_header_offset(&self) -> u64 {
        self.local_header_offset
    }

    /// Get the offset of this entry's central directory header.
    #[inline]
    pub fn central_header_offset(&self) -> u64 {
        self.central_header_offset
    }

    /// Check if this entry represents a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Get the recorded deflate effort level, for deflated entries.
    #[inline]
    pub fn deflate_level(&self) -> Option<DeflateLevel> {
        self.deflate_level
    }

    /// Get the file extension, if any.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
    }

    /// Stream this entry's contents into `sink`, verifying size and CRC-32.
    ///
    /// Seeks `source` to the entry's local file header, validates its
    /// signature, skips the header's own name and extra fields, and pumps
    /// exactly the compressed payload through the decoder in a single
    /// forward pass. Returns the CRC-32 of the uncompressed bytes.
    ///
    /// The sink may have received partial output when an error is returned.
    pub fn decompress_into<R, W>(&self, source: &mut R, sink: &mut W) -> Result<u32>
    where
        R: Read + Seek,
        W: Write,
    {
        source
            .seek(SeekFrom::Start(self.local_header_offset))
            .map_err(Error::Source)?;

        let sig = zip::read_signature(source, RecordKind::LocalHeader)?;
        if sig != LocalFileHeader::SIGNATURE {
            return Err(Error::BadLocalSignature { actual: sig });
        }

        let header = LocalFileHeader::read_from(source)?;
        // The local header's own lengths govern the skip; they may
        // legitimately differ from the central directory's.
        source
            .seek(SeekFrom::Current(header.variable_data_size() as i64))
            .map_err(Error::Source)?;

        let mut bounded = source.by_ref().take(self.compressed_size);
        let (written, crc) = match self.compression_method {
            CompressionMethod::Store => decompress::pump_stored(&mut bounded, sink)?,
            CompressionMethod::Deflate => decompress::pump_deflate(&mut bounded, sink)?,
        };

        if written != self.uncompressed_size {
            return Err(Error::SizeMismatch {
                expected: self.uncompressed_size,
                got: written,
            });
        }
        if crc != self.crc32 {
            return Err(Error::CrcMismatch {
                expected: self.crc32,
                got: crc,
            });
        }
        Ok(crc)
    }
}

#[cfg(test)]
mod tests {
    use zerocopy::FromBytes;

    use super::*;

    fn header_with(
        version_made_by: u16,
        flags: u16,
        method: u16,
        external_attrs: u32,
        sizes: (u32, u32),
    ) -> CentralDirectoryHeader {
        let mut header = CentralDirectoryHeader::read_from_bytes(&[0u8; 42]).unwrap();
        header.version_made_by = version_made_by;
        header.flags = flags;
        header.compression_method = method;
        // 1980-01-01 00:00:00
        header.last_mod_time = 0;
        header.last_mod_date = 0x0021;
        header.compressed_size = sizes.0;
        header.uncompressed_size = sizes.1;
        header.external_attrs = external_attrs;
        header
    }

    #[test]
    fn test_made_by_os_codes() {
        assert_eq!(MadeByOs::from(0), MadeByOs::Dos);
        assert_eq!(MadeByOs::from(3), MadeByOs::Unix);
        assert_eq!(MadeByOs::from(10), MadeByOs::Unknown(10));
    }

    #[test]
    fn test_deflate_level_flags() {
        assert_eq!(DeflateLevel::from_flags(0b000), DeflateLevel::Normal);
        assert_eq!(DeflateLevel::from_flags(0b010), DeflateLevel::Maximum);
        assert_eq!(DeflateLevel::from_flags(0b100), DeflateLevel::Fast);
        assert_eq!(DeflateLevel::from_flags(0b110), DeflateLevel::SuperFast);
    }

    #[test]
    fn test_from_central_basic() {
        let header = header_with(0x031e, 0, 0, 0o100644 << 16, (4, 4));
        let entry =
            ZipEntry::from_central(header, b"dir/file.txt".to_vec(), Vec::new(), Vec::new(), 64)
                .unwrap();

        assert_eq!(entry.name(), "dir/file.txt");
        assert_eq!(entry.made_by_os(), MadeByOs::Unix);
        assert_eq!(entry.made_by_version(), 0x1e);
        assert_eq!(entry.compression_method(), CompressionMethod::Store);
        assert_eq!(entry.central_header_offset(), 64);
        assert_eq!(entry.extension(), Some("txt"));
        assert!(!entry.is_dir());
        assert!(entry.deflate_level().is_none());
    }

    #[test]
    fn test_directory_attribute_bit() {
        let header = header_with(0, 0, 0, 0x10, (0, 0));
        let entry =
            ZipEntry::from_central(header, b"sub/".to_vec(), Vec::new(), Vec::new(), 0).unwrap();

        assert!(entry.is_dir());
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let header = header_with(0, 0, 12, 0, (4, 4));
        let err = ZipEntry::from_central(header, b"a".to_vec(), Vec::new(), Vec::new(), 0)
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedCompression(12)));
    }

    #[test]
    fn test_data_descriptor_rejected() {
        let header = header_with(0, zip::FLAG_DATA_DESCRIPTOR, 8, 0, (0, 0));
        let err = ZipEntry::from_central(header, b"a".to_vec(), Vec::new(), Vec::new(), 0)
            .unwrap_err();

        assert!(matches!(err, Error::DataDescriptorUnsupported));
    }

    #[test]
    fn test_data_descriptor_flag_with_real_sizes_accepted() {
        let header = header_with(0, zip::FLAG_DATA_DESCRIPTOR, 8, 0, (10, 20));
        let entry =
            ZipEntry::from_central(header, b"a".to_vec(), Vec::new(), Vec::new(), 0).unwrap();

        assert_eq!(entry.compressed_size(), 10);
        assert_eq!(entry.uncompressed_size(), 20);
        assert_eq!(entry.deflate_level(), Some(DeflateLevel::Normal));
    }

    #[test]
    fn test_lossy_name_decoding() {
        let header = header_with(0, 0, 0, 0, (0, 0));
        let entry =
            ZipEntry::from_central(header, vec![0x61, 0xff, 0x62], Vec::new(), Vec::new(), 0)
                .unwrap();

        assert_eq!(entry.name(), "a\u{fffd}b");
    }
}
