use super::{FileHeader, RECORD_HEADER_SIZE};
use crate::{
    compression::{Compression, GzipWritableFile},
    env::WritableFile,
    util::{encode_fixed32, Error, Result},
};

/// Destination of the records; chosen once by `Writer::new`.
enum OutputStream<W: WritableFile> {
    Raw(W),
    Gzip(GzipWritableFile<W>),
}

impl<W: WritableFile> OutputStream<W> {
    fn append(&mut self, data: &[u8]) -> Result<()> {
        match self {
            OutputStream::Raw(file) => file.append(data),
            OutputStream::Gzip(file) => file.append(data),
        }
    }

    /// Emits the gzip trailer if any and flushes. The wrapped file stays open.
    fn finish(self) -> Result<()> {
        match self {
            OutputStream::Raw(mut file) => file.flush(),
            OutputStream::Gzip(file) => file.finish().map(|_| ()),
        }
    }
}

/// Blob sequence writer.
///
/// `W` is either a borrowed file (`&mut F`), which the writer never closes,
/// or an owned one that is released when the writer is dropped.
pub struct Writer<W: WritableFile> {
    /// None once closed.
    stream: Option<OutputStream<W>>,
    /// Set once an append fails; the container is then misframed.
    failed: bool,
}

impl<W: WritableFile> Writer<W> {
    /// Writes the file header to `dest` and returns a writer ready for
    /// records.
    pub fn new(mut dest: W, compression: Compression) -> Result<Self> {
        let header = FileHeader::for_compression(compression);
        dest.append(&header.encode())?;
        let stream = match compression {
            Compression::None => OutputStream::Raw(dest),
            Compression::Gzip => OutputStream::Gzip(GzipWritableFile::new(dest)),
        };
        Ok(Self {
            stream: Some(stream),
            failed: false,
        })
    }

    /// Appends one blob. A failure leaves the container unusable: later
    /// writes are refused and the whole container must be discarded.
    pub fn write(&mut self, blob: &[u8]) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::failed_precondition("write() on a closed blob sequence writer"))?;
        if self.failed {
            return Err(Error::failed_precondition(
                "write() on a blob sequence writer after an error",
            ));
        }
        let length = u32::try_from(blob.len()).map_err(|_| {
            Error::invalid_argument(&format!(
                "blob of {} bytes exceeds the maximum record length",
                blob.len()
            ))
        })?;
        let mut header = [0; RECORD_HEADER_SIZE];
        encode_fixed32(&mut header, length);
        let result = stream.append(&header).and_then(|_| stream.append(blob));
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    /// Finalizes the sequence. Must be called before the underlying file is
    /// closed. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.stream.take() {
            Some(stream) => stream.finish(),
            None => Ok(()),
        }
    }
}
