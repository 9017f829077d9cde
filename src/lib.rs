//! Record-oriented binary storage: blob sequence containers (optionally
//! gzip-compressed), TFRecord files, and a reader presenting an ordered set
//! of shard files as one stream of records.

pub mod blob_sequence;
pub mod compression;
pub mod env;
pub mod filename;
pub mod options;
pub mod sharded;
pub mod tf_record;
mod util;

pub use compression::Compression;
pub use env::{Env, Logger, PosixEnv, SequentialFile, WritableFile};
pub use options::ReadOptions;
pub use sharded::{RecordReader, ShardedReader};
pub use util::{Code, Error, Result};

/// Reads the blob sequence shards of a dataset in order.
pub type ShardedBlobSequenceReader = ShardedReader<blob_sequence::Reader<Box<dyn SequentialFile>>>;

/// Reads the TFRecord shards of a dataset in order.
pub type ShardedTFRecordReader = ShardedReader<tf_record::TFRecordReader<Box<dyn SequentialFile>>>;
