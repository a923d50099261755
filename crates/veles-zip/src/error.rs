//! Error types for the ZIP reader.

use thiserror::Error;

use crate::zip::RecordKind;

/// Errors that can occur when reading ZIP archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure reported by the byte source.
    #[error("source I/O error: {0}")]
    Source(#[source] std::io::Error),

    /// I/O failure reported by the caller's sink.
    #[error("sink I/O error: {0}")]
    Sink(#[source] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] veles_common::Error),

    /// Source shorter than the smallest possible archive.
    #[error("source of {len} bytes is shorter than an empty archive")]
    TruncatedSource { len: u64 },

    /// Could not find the end of central directory record.
    #[error("could not find end of central directory record")]
    EocdNotFound,

    /// Archive uses ZIP64 extensions.
    #[error("ZIP64 archives are not supported")]
    Zip64Unsupported,

    /// Short read inside a record's fixed prefix.
    #[error("truncated {0} record")]
    TruncatedHeader(RecordKind),

    /// Short read inside a record's variable-length tail.
    #[error("truncated {0} tail")]
    TruncatedTail(RecordKind),

    /// Central directory signature mismatch.
    #[error("bad central directory signature at entry {index}: got {actual:#010x}")]
    BadCentralSignature { index: u64, actual: u32 },

    /// Local file header signature mismatch.
    #[error("bad local file header signature: got {actual:#010x}")]
    BadLocalSignature { actual: u32 },

    /// Non-zero disk fields in the trailer.
    #[error("multi-volume archives are not supported")]
    MultiVolumeUnsupported,

    /// Unsupported compression method.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    /// Entry relies on a trailing data descriptor for its sizes.
    #[error("data descriptor entries are not supported")]
    DataDescriptorUnsupported,

    /// DOS date/time outside the representable window.
    #[error("invalid DOS date/time: time {time:#06x}, date {date:#06x}")]
    InvalidDateTime { time: u16, date: u16 },

    /// Uncompressed output did not match the declared size.
    #[error("size mismatch: expected {expected} bytes, got {got}")]
    SizeMismatch { expected: u64, got: u64 },

    /// CRC-32 of the uncompressed output did not match.
    #[error("CRC-32 mismatch: expected {expected:#010x}, got {got:#010x}")]
    CrcMismatch { expected: u32, got: u32 },

    /// Two central directory entries share a name.
    #[error("duplicate entry name: {0}")]
    DuplicateName(String),

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// Corrupt DEFLATE stream.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Allocation failure while reading a record tail.
    #[error("out of memory")]
    OutOfMemory,
}

/// Result type for ZIP operations.
pub type Result<T> = std::result::Result<T, Error>;
