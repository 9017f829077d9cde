//! TFRecord files: a sequence of records, each framed as
//!
//! ```text
//! uint64 length
//! uint32 masked crc32c of length
//! byte   data[length]
//! uint32 masked crc32c of data
//! ```
//!
//! All integers are little-endian. Only uncompressed files are supported.

mod reader;
mod writer;

pub use reader::TFRecordReader;
pub use writer::TFRecordWriter;

/// Header is length (8 bytes), masked crc of the length (4 bytes).
const HEADER_SIZE: usize = 8 + 4;

/// Footer is masked crc of the data (4 bytes).
const FOOTER_SIZE: usize = 4;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        env::{Env, PosixEnv, SequentialFile, WritableFile},
        filename::sharded_file_name,
        options::ReadOptions,
        sharded::ShardedReader,
        util::{crc32c, encode_fixed32, Error, Random, Result},
    };

    struct StringDest {
        contents: Vec<u8>,
    }

    impl WritableFile for StringDest {
        fn append(&mut self, data: &[u8]) -> Result<()> {
            self.contents.extend_from_slice(data);
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn sync(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct StringSource {
        contents: Vec<u8>,
    }

    impl SequentialFile for StringSource {
        fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
            let n = dst.len().min(self.contents.len());
            dst[..n].copy_from_slice(&self.contents[..n]);
            self.contents.drain(..n);
            Ok(n)
        }
    }

    /// Fails a single read, the first one starting at `fail_at`.
    struct FlakySource {
        contents: Vec<u8>,
        delivered: usize,
        fail_at: Option<usize>,
    }

    impl SequentialFile for FlakySource {
        fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
            let mut n = dst.len().min(self.contents.len());
            if let Some(fail_at) = self.fail_at {
                if self.delivered >= fail_at {
                    self.fail_at = None;
                    return Err(Error::io_error("transient"));
                }
                n = n.min(fail_at - self.delivered);
            }
            dst[..n].copy_from_slice(&self.contents[..n]);
            self.contents.drain(..n);
            self.delivered += n;
            Ok(n)
        }
    }

    /// Fails the append that would grow the file past `limit`, once.
    struct FlakyDest {
        written: usize,
        limit: Option<usize>,
    }

    impl WritableFile for FlakyDest {
        fn append(&mut self, data: &[u8]) -> Result<()> {
            if let Some(limit) = self.limit {
                if self.written + data.len() > limit {
                    self.limit = None;
                    return Err(Error::io_error("transient"));
                }
            }
            self.written += data.len();
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn sync(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn write_all(records: &[Vec<u8>]) -> Vec<u8> {
        let mut dest = StringDest { contents: vec![] };
        let mut writer = TFRecordWriter::new(&mut dest);
        for record in records {
            writer.write(record).unwrap();
        }
        writer.close().unwrap();
        dest.contents
    }

    fn read_all(contents: Vec<u8>, verify_checksums: bool) -> Result<Vec<Vec<u8>>> {
        let mut reader = TFRecordReader::new(StringSource { contents }, verify_checksums);
        let mut records = vec![];
        let mut record = vec![];
        while reader.next(&mut record)? {
            records.push(record.clone());
        }
        reader.close()?;
        Ok(records)
    }

    fn sample_records() -> Vec<Vec<u8>> {
        vec![b"foo".to_vec(), vec![], b"bar".to_vec(), vec![7; 70000]]
    }

    #[test]
    fn test_tf_record_layout() {
        let contents = write_all(&[b"abc".to_vec()]);
        assert_eq!(HEADER_SIZE + 3 + FOOTER_SIZE, contents.len());
        assert_eq!(&[3, 0, 0, 0, 0, 0, 0, 0], &contents[..8]);
        assert_eq!(
            crc32c::mask(crc32c::value(&contents[..8])).to_le_bytes(),
            contents[8..12]
        );
        assert_eq!(b"abc", &contents[12..15]);
        assert_eq!(
            crc32c::mask(crc32c::value(b"abc")).to_le_bytes(),
            contents[15..]
        );
    }

    #[test]
    fn test_tf_record_read_write() {
        let records = sample_records();
        assert_eq!(records, read_all(write_all(&records), true).unwrap());
        assert!(read_all(write_all(&[]), true).unwrap().is_empty());
    }

    #[test]
    fn test_tf_record_random_records() {
        let mut rnd = Random::new(17);
        let records: Vec<Vec<u8>> = (0..300)
            .map(|_| {
                let len = rnd.skewed(14) as usize;
                rnd.bytes(len)
            })
            .collect();
        assert_eq!(records, read_all(write_all(&records), true).unwrap());
    }

    #[test]
    fn test_tf_record_eof_is_sticky() {
        let mut reader = TFRecordReader::new(
            StringSource {
                contents: write_all(&[b"x".to_vec()]),
            },
            true,
        );
        let mut record = vec![];
        assert!(reader.next(&mut record).unwrap());
        assert!(!reader.next(&mut record).unwrap());
        assert!(!reader.next(&mut record).unwrap());
        reader.close().unwrap();
        reader.close().unwrap();
        assert!(reader.next(&mut record).unwrap_err().is_failed_precondition());
    }

    #[test]
    fn test_tf_record_truncation() {
        let records = vec![b"first".to_vec(), b"second".to_vec()];
        let contents = write_all(&records);
        let second_start = HEADER_SIZE + 5 + FOOTER_SIZE;
        assert_eq!(
            records[..1].to_vec(),
            read_all(contents[..second_start].to_vec(), true).unwrap()
        );
        for cut in second_start + 1..contents.len() {
            for verify_checksums in [true, false] {
                let error = read_all(contents[..cut].to_vec(), verify_checksums).unwrap_err();
                assert!(error.is_corruption(), "cut at {}: {}", cut, error);
            }
        }
    }

    #[test]
    fn test_tf_record_bad_data_checksum() {
        let mut contents = write_all(&sample_records());
        contents[HEADER_SIZE] ^= 0x01;
        let error = read_all(contents.clone(), true).unwrap_err();
        assert!(error.is_corruption());
        assert!(error.to_string().contains("data checksum"));

        // Without verification the flipped byte comes through.
        let records = read_all(contents, false).unwrap();
        assert_eq!(b"goo", records[0].as_slice());
    }

    #[test]
    fn test_tf_record_bad_length_checksum() {
        let mut contents = write_all(&sample_records());
        encode_fixed32(&mut contents[8..12], 0xdeadbeef);
        let error = read_all(contents, true).unwrap_err();
        assert!(error.to_string().contains("length checksum"), "{}", error);
    }

    #[test]
    fn test_tf_record_read_error_is_final() {
        // Fails inside the data of the first record, then recovers.
        let source = FlakySource {
            contents: write_all(&sample_records()),
            delivered: 0,
            fail_at: Some(HEADER_SIZE + 1),
        };
        let mut reader = TFRecordReader::new(source, false);
        let mut record = vec![];
        assert!(reader.next(&mut record).unwrap_err().is_io_error());
        for _ in 0..2 {
            let error = reader.next(&mut record).unwrap_err();
            assert!(error.is_failed_precondition(), "{}", error);
        }
    }

    #[test]
    fn test_tf_record_checksum_error_is_final() {
        let mut contents = write_all(&sample_records());
        contents[HEADER_SIZE] ^= 0x01;
        let mut reader = TFRecordReader::new(StringSource { contents }, true);
        let mut record = vec![];
        assert!(reader.next(&mut record).unwrap_err().is_corruption());
        assert!(reader.next(&mut record).unwrap_err().is_failed_precondition());
    }

    #[test]
    fn test_tf_record_write_error_is_final() {
        let mut dest = FlakyDest {
            written: 0,
            limit: Some(HEADER_SIZE + 1),
        };
        let mut writer = TFRecordWriter::new(&mut dest);
        assert!(writer.write(b"torn").unwrap_err().is_io_error());
        let error = writer.write(b"next").unwrap_err();
        assert!(error.is_failed_precondition(), "{}", error);
        drop(writer);
        assert_eq!(HEADER_SIZE, dest.written);
    }

    #[test]
    fn test_tf_record_writer_close() {
        let mut dest = StringDest { contents: vec![] };
        let mut writer = TFRecordWriter::new(&mut dest);
        writer.write(b"r").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.write(b"late").unwrap_err().is_failed_precondition());
    }

    #[test]
    fn test_tf_record_sharded_files() {
        let dir = tempfile::tempdir().unwrap();
        let env: Arc<dyn Env> = Arc::new(PosixEnv::new());
        let base = dir.path().join("toy.tfrecord").to_string_lossy().into_owned();
        let shards: [Vec<Vec<u8>>; 2] = [
            vec![b"e0".to_vec(), b"e1".to_vec(), b"e2".to_vec()],
            vec![b"e3".to_vec()],
        ];
        for (index, records) in shards.iter().enumerate() {
            let mut file = env
                .new_writable_file(&sharded_file_name(&base, index, shards.len()))
                .unwrap();
            let mut writer = TFRecordWriter::new(&mut file);
            for record in records {
                writer.write(record).unwrap();
            }
            writer.close().unwrap();
            file.close().unwrap();
        }

        let mut reader: ShardedReader<TFRecordReader<Box<dyn SequentialFile>>> =
            ShardedReader::new(env, ReadOptions::default());
        reader.open_sharded_path(&format!("{}@2", base)).unwrap();
        let mut record = vec![];
        let mut count = 0;
        while reader.next(&mut record).unwrap() {
            assert_eq!(format!("e{}", count).as_bytes(), record.as_slice());
            count += 1;
        }
        assert_eq!(4, count);
    }

    #[test]
    fn test_tf_record_sharded_checksum_failure() {
        let dir = tempfile::tempdir().unwrap();
        let env: Arc<dyn Env> = Arc::new(PosixEnv::new());
        let path = dir.path().join("bad").to_string_lossy().into_owned();
        let mut contents = write_all(&sample_records());
        contents[HEADER_SIZE + 1] ^= 0x20;
        let mut file = env.new_writable_file(&path).unwrap();
        file.append(&contents).unwrap();
        file.close().unwrap();

        let mut reader: ShardedReader<TFRecordReader<Box<dyn SequentialFile>>> =
            ShardedReader::new(env.clone(), ReadOptions::default());
        reader.open(&[path.clone()]).unwrap();
        let mut record = vec![];
        let error: Error = reader.next(&mut record).unwrap_err();
        assert!(error.is_corruption());

        let options = ReadOptions {
            verify_checksums: false,
            ..ReadOptions::default()
        };
        let mut reader: ShardedReader<TFRecordReader<Box<dyn SequentialFile>>> =
            ShardedReader::new(env, options);
        reader.open(&[path]).unwrap();
        assert!(reader.next(&mut record).unwrap());
        assert_eq!(b"fOo", record.as_slice());
    }
}
