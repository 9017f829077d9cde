mod reader;

use std::sync::Arc;

pub use reader::ShardedReader;

use crate::{env::Env, options::ReadOptions, util::Result};

/// A reader of one record file, opened by path.
///
/// Any format implementing this can be read as a sharded dataset through
/// `ShardedReader`. Once `next` returns `Ok(false)`, every later call must
/// return `Ok(false)` as well.
pub trait RecordReader: Sized {
    type Record;

    fn open(env: &Arc<dyn Env>, path: &str, options: &ReadOptions) -> Result<Self>;

    /// Reads the next record into `record`. Returns false iff no more records
    /// are available.
    fn next(&mut self, record: &mut Self::Record) -> Result<bool>;

    fn close(&mut self) -> Result<()>;
}
