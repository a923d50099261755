//! ZIP archive reader.
//!
//! Opening an archive is a strict sequence: query the source length, locate
//! the end-of-central-directory record by scanning backward from the end,
//! reject multi-volume and ZIP64 archives, then walk the central directory
//! once to build the member index. Member contents are decompressed on
//! demand, one at a time, through the shared seek cursor.

use std::collections::hash_map::{self, HashMap};
use std::io::{Read, Seek, SeekFrom, Write};

use memchr::memmem;

use crate::entry::ZipEntry;
use crate::zip::{self, CentralDirectoryHeader, EocdRecord, RecordKind};
use crate::{Error, Result};

/// Chunk size for the backward EOCD scan.
const EOCD_SCAN_CHUNK: usize = 4096;

/// Widest possible trailer region: fixed record plus a maximal comment.
const EOCD_SEARCH_WINDOW: u64 = EocdRecord::MIN_ARCHIVE_SIZE + u16::MAX as u64;

/// A ZIP archive indexed from a seekable byte source.
///
/// The archive owns the source for its lifetime and keeps an
/// insertion-ordered member index keyed by name (byte-exact,
/// case-sensitive). Lookups never touch the source; reads seek to the
/// member's local header and stream its payload to a caller-supplied sink.
pub struct ZipArchive<R> {
    /// Underlying byte source.
    source: R,
    /// Members in central directory order.
    entries: Vec<ZipEntry>,
    /// Name to ordinal position.
    index: HashMap<String, usize>,
    /// Archive comment, verbatim.
    comment: Vec<u8>,
    /// Offset of the central directory.
    central_dir_offset: u64,
    /// Absolute offset of the end-of-central-directory signature.
    eocd_offset: u64,
}

impl<R: Read + Seek> ZipArchive<R> {
    /// Open an archive from a seekable source.
    ///
    /// On any failure the source is dropped along with everything parsed
    /// so far; no partially-indexed archive is ever returned.
    pub fn open(mut source: R) -> Result<Self> {
        let len = source.seek(SeekFrom::End(0)).map_err(Error::Source)?;
        let located = locate_eocd(&mut source, len)?;
        let eocd = located.record;

        if eocd.is_zip64() {
            return Err(Error::Zip64Unsupported);
        }
        if eocd.disk_number != 0
            || eocd.central_dir_disk != 0
            || eocd.central_dir_count_disk != eocd.central_dir_count_total
        {
            return Err(Error::MultiVolumeUnsupported);
        }

        let central_dir_offset = eocd.central_dir_offset as u64;
        let count = eocd.central_dir_count_total as usize;
        let (entries, index) = walk_central_directory(&mut source, central_dir_offset, count)?;

        Ok(Self {
            source,
            entries,
            index,
            comment: located.comment,
            central_dir_offset,
            eocd_offset: located.offset,
        })
    }

    /// Get the number of members.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Get the archive comment, verbatim.
    #[inline]
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    /// Get the offset of the central directory.
    #[inline]
    pub fn central_dir_offset(&self) -> u64 {
        self.central_dir_offset
    }

    /// Get the absolute offset of the end-of-central-directory signature.
    #[inline]
    pub fn eocd_offset(&self) -> u64 {
        self.eocd_offset
    }

    /// Get an entry by its position in the central directory.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&ZipEntry> {
        self.entries.get(index)
    }

    /// Find an entry by exact name.
    pub fn find(&self, name: &str) -> Option<&ZipEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Get the position of the named entry in the central directory.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Iterate over entries in central directory order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ZipEntry> {
        self.entries.iter()
    }

    /// Stream one member into `sink`, returning its CRC-32.
    pub fn read_to<W: Write>(&mut self, index: usize, sink: &mut W) -> Result<u32> {
        let entry = self
            .entries
            .get(index)
            .ok_or_else(|| Error::EntryNotFound(format!("index {index}")))?;
        entry.decompress_into(&mut self.source, sink)
    }

    /// Read one member fully into memory.
    pub fn read(&mut self, index: usize) -> Result<Vec<u8>> {
        let capacity = self
            .entries
            .get(index)
            .map_or(0, |e| e.uncompressed_size() as usize);
        let mut data = Vec::with_capacity(capacity);
        self.read_to(index, &mut data)?;
        Ok(data)
    }

    /// Read a member by name fully into memory.
    pub fn read_by_name(&mut self, name: &str) -> Result<Vec<u8>> {
        let index = self
            .index_of(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        self.read(index)
    }

    /// Release the archive, handing the source back.
    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R> std::fmt::Debug for ZipArchive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchive")
            .field("entries", &self.entries.len())
            .field("comment_len", &self.comment.len())
            .finish()
    }
}

/// A verified trailer: the decoded record, its absolute offset, and the
/// archive comment that follows it.
struct LocatedEocd {
    record: EocdRecord,
    offset: u64,
    comment: Vec<u8>,
}

/// Scan the trailing window of the source for the real trailer.
///
/// The signature can legally appear inside the archive comment, so every
/// candidate is verified by decoding its fixed record and requiring the
/// declared comment to reach end-of-file exactly. Scanning backward and
/// returning the first verified match yields the last valid signature.
fn locate_eocd<R: Read + Seek>(source: &mut R, len: u64) -> Result<LocatedEocd> {
    if len < EocdRecord::MIN_ARCHIVE_SIZE {
        return Err(Error::TruncatedSource { len });
    }

    let window_start = len.saturating_sub(EOCD_SEARCH_WINDOW);
    let overlap = EocdRecord::MAGIC.len() as u64 - 1;

    let mut chunk = vec![0u8; EOCD_SCAN_CHUNK + overlap as usize];
    let mut chunk_end = len;

    while chunk_end > window_start {
        let chunk_start = chunk_end
            .saturating_sub(EOCD_SCAN_CHUNK as u64)
            .max(window_start);
        // Read past the chunk boundary so a signature straddling two
        // chunks is still seen.
        let read_end = (chunk_end + overlap).min(len);
        let buf = &mut chunk[..(read_end - chunk_start) as usize];

        source
            .seek(SeekFrom::Start(chunk_start))
            .map_err(Error::Source)?;
        source.read_exact(buf).map_err(Error::Source)?;

        // Last signature wins: walk matches back to front.
        let mut search: &[u8] = buf;
        while let Some(pos) = memmem::rfind(search, &EocdRecord::MAGIC) {
            let candidate = chunk_start + pos as u64;
            if let Some(located) = verify_eocd_candidate(source, candidate, len)? {
                return Ok(located);
            }
            search = &search[..pos];
        }

        chunk_end = chunk_start;
    }

    Err(Error::EocdNotFound)
}

/// Decode the record at a candidate signature offset.
///
/// Returns `None` when the record does not fit or its declared comment
/// does not end exactly at end-of-file.
fn verify_eocd_candidate<R: Read + Seek>(
    source: &mut R,
    offset: u64,
    len: u64,
) -> Result<Option<LocatedEocd>> {
    if offset + EocdRecord::MIN_ARCHIVE_SIZE > len {
        return Ok(None);
    }

    source
        .seek(SeekFrom::Start(offset + 4))
        .map_err(Error::Source)?;
    let record = match EocdRecord::read_from(source) {
        Ok(record) => record,
        Err(Error::TruncatedHeader(_)) => return Ok(None),
        Err(e) => return Err(e),
    };

    let comment_len = record.comment_length as u64;
    if offset + EocdRecord::MIN_ARCHIVE_SIZE + comment_len != len {
        return Ok(None);
    }

    let comment = zip::read_tail(source, comment_len as usize, RecordKind::Eocd)?;
    Ok(Some(LocatedEocd {
        record,
        offset,
        comment,
    }))
}

/// Walk the central directory, building the ordered entry list and the
/// name index.
fn walk_central_directory<R: Read + Seek>(
    source: &mut R,
    cd_offset: u64,
    count: usize,
) -> Result<(Vec<ZipEntry>, HashMap<String, usize>)> {
    let mut entries = Vec::with_capacity(count);
    let mut index = HashMap::with_capacity(count);
    let mut pos = cd_offset;

    for ordinal in 0..count {
        source.seek(SeekFrom::Start(pos)).map_err(Error::Source)?;

        let sig = zip::read_signature(source, RecordKind::CentralHeader)?;
        if sig != CentralDirectoryHeader::SIGNATURE {
            return Err(Error::BadCentralSignature {
                index: ordinal as u64,
                actual: sig,
            });
        }

        let header = CentralDirectoryHeader::read_from(source)?;
        let name = zip::read_tail(
            source,
            header.file_name_length as usize,
            RecordKind::CentralHeader,
        )?;
        let extra = zip::read_tail(
            source,
            header.extra_field_length as usize,
            RecordKind::CentralHeader,
        )?;
        let comment = zip::read_tail(
            source,
            header.file_comment_length as usize,
            RecordKind::CentralHeader,
        )?;

        let record_len =
            4 + CentralDirectoryHeader::SIZE as u64 + header.variable_data_size() as u64;
        let entry = ZipEntry::from_central(header, name, extra, comment, pos)?;

        match index.entry(entry.name().to_owned()) {
            hash_map::Entry::Occupied(_) => {
                return Err(Error::DuplicateName(entry.name().to_owned()));
            }
            hash_map::Entry::Vacant(slot) => {
                slot.insert(ordinal);
            }
        }
        entries.push(entry);
        pos += record_len;
    }

    Ok((entries, index))
}
