//! CRC-32 hashing utilities.
//!
//! ZIP archives checksum member contents with CRC-32 using the ISO-HDLC
//! polynomial (the same variant zlib uses). The seeded form continues a
//! previous computation, so callers can hash a stream chunk by chunk.

/// Compute the CRC-32 of a byte slice.
///
/// Uses hardware acceleration when available.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Compute the CRC-32 of a byte slice with a seed value.
///
/// This continues a previous CRC computation; a seed of zero is
/// equivalent to starting fresh.
#[inline]
pub fn hash_bytes_with_seed(data: &[u8], seed: u32) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(seed);
    hasher.update(data);
    hasher.finalize()
}
