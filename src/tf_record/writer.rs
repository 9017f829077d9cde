use super::{FOOTER_SIZE, HEADER_SIZE};
use crate::{
    env::WritableFile,
    util::{crc32c, encode_fixed32, encode_fixed64, Error, Result},
};

pub struct TFRecordWriter<W: WritableFile> {
    /// None once closed.
    dest: Option<W>,
    /// Set once an append fails.
    failed: bool,
}

impl<W: WritableFile> TFRecordWriter<W> {
    pub fn new(dest: W) -> Self {
        Self {
            dest: Some(dest),
            failed: false,
        }
    }

    pub fn write(&mut self, record: &[u8]) -> Result<()> {
        let dest = self
            .dest
            .as_mut()
            .ok_or_else(|| Error::failed_precondition("write() on a closed TFRecord writer"))?;
        if self.failed {
            return Err(Error::failed_precondition(
                "write() on a TFRecord writer after an error",
            ));
        }
        let mut header = [0; HEADER_SIZE];
        encode_fixed64(&mut header, record.len() as u64);
        let length_crc = crc32c::mask(crc32c::value(&header[..8]));
        encode_fixed32(&mut header[8..], length_crc);
        let mut footer = [0; FOOTER_SIZE];
        encode_fixed32(&mut footer, crc32c::mask(crc32c::value(record)));

        let result = dest
            .append(&header)
            .and_then(|_| dest.append(record))
            .and_then(|_| dest.append(&footer));
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    /// Flushes the file, which stays open. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.dest.take() {
            Some(mut dest) => dest.flush(),
            None => Ok(()),
        }
    }
}
