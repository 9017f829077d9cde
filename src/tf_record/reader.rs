use std::sync::Arc;

use super::{FOOTER_SIZE, HEADER_SIZE};
use crate::{
    env::{read_fully, read_to_vec, Env, SequentialFile},
    options::ReadOptions,
    sharded::RecordReader,
    util::{crc32c, decode_fixed32, decode_fixed64, Error, Result},
};

pub struct TFRecordReader<S: SequentialFile> {
    /// None once closed.
    file: Option<S>,
    verify_checksums: bool,
    eof: bool,
    failed: bool,
}

impl<S: SequentialFile> TFRecordReader<S> {
    pub fn new(file: S, verify_checksums: bool) -> Self {
        Self {
            file: Some(file),
            verify_checksums,
            eof: false,
            failed: false,
        }
    }

    /// Reads the next record into `record`. Returns false iff no more records
    /// are available; once false, always false. Any error is final.
    pub fn next(&mut self, record: &mut Vec<u8>) -> Result<bool> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| Error::failed_precondition("next() on a closed TFRecord reader"))?;
        if self.failed {
            return Err(Error::failed_precondition(
                "next() on a TFRecord reader after an error",
            ));
        }
        if self.eof {
            return Ok(false);
        }
        match read_record(file, self.verify_checksums, record) {
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

    /// Releases the reader; an owned file is dropped. Closing twice is a
    /// no-op.
    pub fn close(&mut self) -> Result<()> {
        self.file = None;
        Ok(())
    }
}

/// Reads one framed record. Returns false at a clean end of file.
fn read_record<F: SequentialFile + ?Sized>(
    file: &mut F,
    verify_checksums: bool,
    record: &mut Vec<u8>,
) -> Result<bool> {
    let mut header = [0; HEADER_SIZE];
    match read_fully(file, &mut header)? {
        0 => return Ok(false),
        HEADER_SIZE => {}
        read => {
            return Err(Error::corruption(&format!(
                "truncated TFRecord header: {} of {} bytes available",
                read, HEADER_SIZE
            )))
        }
    }
    if verify_checksums {
        check_crc(&header[..8], decode_fixed32(&header[8..]), "length")?;
    }

    let length = usize::try_from(decode_fixed64(&header))
        .map_err(|_| Error::corruption("TFRecord length does not fit in memory"))?;
    if !read_to_vec(file, length, record)? {
        return Err(Error::corruption(&format!(
            "truncated TFRecord data: {} of {} bytes available",
            record.len(),
            length
        )));
    }

    let mut footer = [0; FOOTER_SIZE];
    if read_fully(file, &mut footer)? < FOOTER_SIZE {
        return Err(Error::corruption("truncated TFRecord footer"));
    }
    if verify_checksums {
        check_crc(record, decode_fixed32(&footer), "data")?;
    }
    Ok(true)
}

fn check_crc(data: &[u8], masked_crc: u32, what: &str) -> Result<()> {
    let expected = crc32c::unmask(masked_crc);
    let actual = crc32c::value(data);
    if actual != expected {
        return Err(Error::corruption(&format!(
            "TFRecord {} checksum mismatch: expected {:#010x}, got {:#010x}",
            what, expected, actual
        )));
    }
    Ok(())
}

impl RecordReader for TFRecordReader<Box<dyn SequentialFile>> {
    type Record = Vec<u8>;

    fn open(env: &Arc<dyn Env>, path: &str, options: &ReadOptions) -> Result<Self> {
        let file = env.new_sequential_file(path)?;
        Ok(TFRecordReader::new(file, options.verify_checksums))
    }

    fn next(&mut self, record: &mut Vec<u8>) -> Result<bool> {
        TFRecordReader::next(self, record)
    }

    fn close(&mut self) -> Result<()> {
        TFRecordReader::close(self)
    }
}
