//! A blob sequence is a sequence of blobs (lists of bytes) stored in a byte
//! stream, e.g. a file.
//!
//! Writing:
//!
//! ```no_run
//! # use blobseq::{blob_sequence::Writer, Compression, Env, PosixEnv, WritableFile};
//! # fn main() -> blobseq::Result<()> {
//! let mut file = PosixEnv::new().new_writable_file("/tmp/blobs")?;
//! let mut writer = Writer::new(&mut file, Compression::Gzip)?;
//! writer.write(b"HELLO")?;
//! writer.write(b"WORLD")?;
//! writer.close()?;
//! drop(writer);
//! file.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! Reading:
//!
//! ```no_run
//! # use blobseq::{blob_sequence::Reader, Env, PosixEnv};
//! # fn main() -> blobseq::Result<()> {
//! let mut file = PosixEnv::new().new_sequential_file("/tmp/blobs")?;
//! let mut reader = Reader::new(&mut file)?;
//! let mut blob = vec![];
//! while reader.read(&mut blob)? {
//!     println!("{} bytes", blob.len());
//! }
//! reader.close()?;
//! # Ok(())
//! # }
//! ```

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use crate::{
    compression::Compression,
    util::{decode_fixed16, encode_fixed16, Error, Result},
};

const MAGIC: [u8; 2] = *b"BS";

/// Version of the format:
///   0: Initial version.
///   1: Add support for gzip compression.
const MAX_VERSION: u16 = 1;

/// Header is magic (2 bytes), version (2 bytes), compression (1 byte),
/// reserved (1 byte), reserved (2 bytes).
const FILE_HEADER_SIZE: usize = 2 + 2 + 1 + 1 + 2;

/// Header is payload length (4 bytes).
const RECORD_HEADER_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileHeader {
    version: u16,
    compression: Compression,
}

impl FileHeader {
    /// Uses the oldest version able to express `compression`.
    fn for_compression(compression: Compression) -> Self {
        let version = match compression {
            Compression::None => 0,
            Compression::Gzip => 1,
        };
        Self {
            version,
            compression,
        }
    }

    /// Reserved bytes are always written as zero.
    fn encode(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut buf = [0; FILE_HEADER_SIZE];
        buf[..2].copy_from_slice(&MAGIC);
        encode_fixed16(&mut buf[2..4], self.version);
        buf[4] = self.compression as u8;
        buf
    }

    /// Reserved bytes are ignored on every version.
    fn decode(buf: &[u8; FILE_HEADER_SIZE]) -> Result<Self> {
        if buf[..2] != MAGIC {
            return Err(bad_magic(&buf[..2]));
        }
        let version = decode_fixed16(&buf[2..4]);
        if version > MAX_VERSION {
            return Err(Error::not_supported(&format!(
                "blob sequence version {} is newer than the supported version {}",
                version, MAX_VERSION
            )));
        }
        let compression = if version == 0 {
            Compression::None
        } else {
            Compression::try_from(buf[4])?
        };
        Ok(Self {
            version,
            compression,
        })
    }
}

fn bad_magic(magic: &[u8]) -> Error {
    Error::corruption(&format!(
        "not a blob sequence: magic {:02x?} instead of {:02x?}",
        magic, MAGIC
    ))
}
