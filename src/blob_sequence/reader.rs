use std::sync::Arc;

use super::{bad_magic, FileHeader, FILE_HEADER_SIZE, MAGIC, RECORD_HEADER_SIZE};
use crate::{
    compression::{Compression, GzipSequentialFile},
    env::{read_fully, read_to_vec, Env, SequentialFile},
    options::ReadOptions,
    sharded::RecordReader,
    util::{decode_fixed32, Error, Result},
};

/// Source of the records; chosen once from the file header.
enum InputStream<S: SequentialFile> {
    Raw(S),
    Gzip(GzipSequentialFile<S>),
}

impl<S: SequentialFile> SequentialFile for InputStream<S> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        match self {
            InputStream::Raw(file) => file.read(dst),
            InputStream::Gzip(file) => file.read(dst),
        }
    }
}

/// Blob sequence reader.
///
/// `S` is either a borrowed file (`&mut F`), which the reader never closes,
/// or an owned one (as used when reading shards by path).
pub struct Reader<S: SequentialFile> {
    /// None once closed.
    stream: Option<InputStream<S>>,
    header: FileHeader,
    eof: bool,
    failed: bool,
}

impl<S: SequentialFile> Reader<S> {
    /// Reads and validates the file header of `src`.
    pub fn new(mut src: S) -> Result<Self> {
        let mut buf = [0; FILE_HEADER_SIZE];
        let read = read_fully(&mut src, &mut buf)?;
        if read >= MAGIC.len() && buf[..MAGIC.len()] != MAGIC {
            return Err(bad_magic(&buf[..MAGIC.len()]));
        }
        if read < FILE_HEADER_SIZE {
            return Err(Error::io_error(&format!(
                "blob sequence header truncated: {} of {} bytes available",
                read, FILE_HEADER_SIZE
            )));
        }
        let header = FileHeader::decode(&buf)?;
        let stream = match header.compression {
            Compression::None => InputStream::Raw(src),
            Compression::Gzip => InputStream::Gzip(GzipSequentialFile::new(src)),
        };
        Ok(Self {
            stream: Some(stream),
            header,
            eof: false,
            failed: false,
        })
    }

    pub fn version(&self) -> u16 {
        self.header.version
    }

    pub fn compression(&self) -> Compression {
        self.header.compression
    }

    /// Reads the next blob into `blob`. Returns false iff no more blobs are
    /// available; once false, always false. After an error the position in
    /// the stream is unknown, so every later call fails.
    pub fn read(&mut self, blob: &mut Vec<u8>) -> Result<bool> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::failed_precondition("read() on a closed blob sequence reader"))?;
        if self.failed {
            return Err(Error::failed_precondition(
                "read() on a blob sequence reader after an error",
            ));
        }
        if self.eof {
            return Ok(false);
        }
        match read_record(stream, blob) {
            Ok(found) => {
                self.eof = !found;
                Ok(found)
            }
            Err(error) => {
                self.failed = true;
                Err(error)
            }
        }
    }

    /// Releases the reader. The underlying file is not closed by this call,
    /// but an owned one is dropped. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.stream = None;
        Ok(())
    }
}

/// Reads one length-prefixed blob. Returns false at a clean end of stream.
fn read_record<F: SequentialFile + ?Sized>(file: &mut F, blob: &mut Vec<u8>) -> Result<bool> {
    let mut header = [0; RECORD_HEADER_SIZE];
    match read_fully(file, &mut header)? {
        0 => return Ok(false),
        RECORD_HEADER_SIZE => {}
        read => {
            return Err(Error::corruption(&format!(
                "truncated record header: {} of {} bytes available",
                read, RECORD_HEADER_SIZE
            )))
        }
    }

    let length = decode_fixed32(&header) as usize;
    if !read_to_vec(file, length, blob)? {
        return Err(Error::corruption(&format!(
            "truncated record payload: {} of {} bytes available",
            blob.len(),
            length
        )));
    }
    Ok(true)
}

impl RecordReader for Reader<Box<dyn SequentialFile>> {
    type Record = Vec<u8>;

    fn open(env: &Arc<dyn Env>, path: &str, _options: &ReadOptions) -> Result<Self> {
        Reader::new(env.new_sequential_file(path)?)
    }

    fn next(&mut self, record: &mut Vec<u8>) -> Result<bool> {
        self.read(record)
    }

    fn close(&mut self) -> Result<()> {
        Reader::close(self)
    }
}
