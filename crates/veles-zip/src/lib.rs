//! ZIP archive reading over a seekable byte source.
//!
//! This crate locates the end-of-central-directory trailer by scanning
//! backward from the end of the source, walks the central directory into an
//! insertion-ordered member index, and streams member contents to
//! caller-supplied sinks with CRC-32 and size verification. It supports:
//!
//! - Stored (method 0) and DEFLATE (method 8) members
//! - Archives with trailing comments, including comments that embed the
//!   trailer signature
//! - Member lookup by name or by central directory position
//! - DOS date/time, host OS, and attribute metadata per member
//!
//! Writing archives, ZIP64 extensions, encryption, and multi-volume
//! archives are out of scope.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use veles_zip::ZipArchive;
//!
//! let file = BufReader::new(File::open("assets.zip")?);
//! let mut archive = ZipArchive::open(file)?;
//!
//! for entry in archive.iter() {
//!     println!("{}: {} bytes", entry.name(), entry.uncompressed_size());
//! }
//!
//! if let Some(index) = archive.index_of("readme.txt") {
//!     let data = archive.read(index)?;
//!     println!("{}", String::from_utf8_lossy(&data));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod archive;
mod datetime;
mod decompress;
mod entry;
mod error;
pub mod zip;

pub use archive::ZipArchive;
pub use datetime::DosDateTime;
pub use entry::{DeflateLevel, MadeByOs, ZipEntry};
pub use error::{Error, Result};
