//! Streaming decompression for archive members.

use std::io::{self, Read, Write};

use flate2::read::DeflateDecoder;

use veles_common::crc;

use crate::{Error, Result};

/// Chunk size for the copy loops.
const BUF_SIZE: usize = 4096;

/// Copy a stored payload to the sink, hashing as it goes.
///
/// Returns the number of bytes written and their CRC-32.
pub(crate) fn pump_stored<R: Read, W: Write>(reader: &mut R, sink: &mut W) -> Result<(u64, u32)> {
    pump(reader, sink, Error::Source)
}

/// Inflate a raw-DEFLATE payload to the sink, hashing as it goes.
///
/// Returns the number of uncompressed bytes written and their CRC-32.
pub(crate) fn pump_deflate<R: Read, W: Write>(reader: &mut R, sink: &mut W) -> Result<(u64, u32)> {
    let mut decoder = DeflateDecoder::new(reader);
    pump(&mut decoder, sink, |e| {
        // flate2 reports a corrupt stream as InvalidInput or InvalidData;
        // anything else came through from the underlying source.
        match e.kind() {
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
                Error::Decompression(e.to_string())
            }
            _ => Error::Source(e),
        }
    })
}

fn pump<R: Read, W: Write>(
    reader: &mut R,
    sink: &mut W,
    map_read_err: impl Fn(io::Error) -> Error,
) -> Result<(u64, u32)> {
    let mut buf = [0u8; BUF_SIZE];
    let mut written = 0u64;
    let mut hash = 0u32;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_read_err(e)),
        };
        sink.write_all(&buf[..n]).map_err(Error::Sink)?;
        hash = crc::hash_bytes_with_seed(&buf[..n], hash);
        written += n as u64;
    }

    Ok((written, hash))
}
