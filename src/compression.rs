//! Gzip adapters over `SequentialFile` / `WritableFile`.
//!
//! The adapters expose the same capability as the file they wrap, so a
//! record codec installed on top of them never knows whether its bytes are
//! compressed.

use std::io::{self, Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder};

use crate::{
    env::{SequentialFile, WritableFile},
    util::{Error, Result},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Compression {
    #[default]
    None = 0,
    Gzip = 1,
}

impl TryFrom<u8> for Compression {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Compression::None),
            1 => Ok(Compression::Gzip),
            _ => Err(Error::not_supported(&format!(
                "unknown compression id {}",
                value
            ))),
        }
    }
}

/// Lets flate2 pull bytes from a `SequentialFile`.
struct FileReader<S> {
    file: S,
}

impl<S: SequentialFile> Read for FileReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf).map_err(io::Error::from)
    }
}

/// Lets flate2 push bytes into a `WritableFile`.
struct FileWriter<W> {
    file: W,
}

impl<W: WritableFile> Write for FileWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush().map_err(io::Error::from)
    }
}

/// Inflates a gzip stream read from `S`.
pub struct GzipSequentialFile<S: SequentialFile> {
    decoder: GzDecoder<FileReader<S>>,
}

impl<S: SequentialFile> GzipSequentialFile<S> {
    pub fn new(file: S) -> Self {
        Self {
            decoder: GzDecoder::new(FileReader { file }),
        }
    }
}

impl<S: SequentialFile> SequentialFile for GzipSequentialFile<S> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        loop {
            match self.decoder.read(dst) {
                Ok(n) => return Ok(n),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(decompression_error(error)),
            }
        }
    }
}

/// Failures of the wrapped file surface unchanged; anything flate2 raises
/// itself means the compressed bytes are bad.
fn decompression_error(error: io::Error) -> Error {
    if error
        .get_ref()
        .map_or(false, |inner| inner.downcast_ref::<Error>().is_some())
    {
        return error.into();
    }
    Error::corruption(&format!("gzip decompression failed: {}", error))
}

/// Deflates everything appended into a gzip stream written to `W`.
///
/// `close` must be called before the wrapped file is closed: it emits the
/// gzip trailer. The wrapped file itself is flushed but left open.
pub struct GzipWritableFile<W: WritableFile> {
    /// None once closed.
    encoder: Option<GzEncoder<FileWriter<W>>>,
}

impl<W: WritableFile> GzipWritableFile<W> {
    pub fn new(file: W) -> Self {
        Self {
            encoder: Some(GzEncoder::new(
                FileWriter { file },
                flate2::Compression::default(),
            )),
        }
    }

    fn encoder(&mut self) -> Result<&mut GzEncoder<FileWriter<W>>> {
        self.encoder
            .as_mut()
            .ok_or_else(|| Error::failed_precondition("gzip stream is closed"))
    }

    /// Writes the gzip trailer and hands back the wrapped file.
    pub fn finish(mut self) -> Result<W> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| Error::failed_precondition("gzip stream is closed"))?;
        let mut writer = encoder.finish()?;
        writer.file.flush()?;
        Ok(writer.file)
    }
}

impl<W: WritableFile> WritableFile for GzipWritableFile<W> {
    fn append(&mut self, data: &[u8]) -> Result<()> {
        self.encoder()?.write_all(data)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(encoder) = self.encoder.take() {
            let mut writer = encoder.finish()?;
            writer.file.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.encoder()?.flush()?;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        let encoder = self.encoder()?;
        encoder.flush()?;
        encoder.get_mut().file.sync()
    }
}
