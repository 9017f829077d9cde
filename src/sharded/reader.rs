use std::{mem, sync::Arc};

use super::RecordReader;
use crate::{
    env::Env,
    filename::expand_sharded_path,
    options::ReadOptions,
    util::{Error, Result},
};

enum State<R> {
    Unopened,
    Active { shard_idx: usize, reader: R },
    Exhausted,
    Failed,
}

/// Reads an ordered list of shards as one stream of records.
///
/// Exactly one shard is open at a time: shard `i + 1` is opened only once
/// shard `i` reports end of stream, and shard `i` is closed first. A shard
/// that cannot be opened or read fails the whole reader; it is never
/// skipped.
pub struct ShardedReader<R: RecordReader> {
    env: Arc<dyn Env>,
    options: ReadOptions,
    paths: Vec<String>,
    state: State<R>,
}

impl<R: RecordReader> ShardedReader<R> {
    pub fn new(env: Arc<dyn Env>, options: ReadOptions) -> Self {
        Self {
            env,
            options,
            paths: vec![],
            state: State::Unopened,
        }
    }

    /// Opens the first of `paths`. The list must not be empty.
    pub fn open(&mut self, paths: &[String]) -> Result<()> {
        if !matches!(self.state, State::Unopened) {
            return Err(Error::failed_precondition(
                "open() on a sharded reader that is already open",
            ));
        }
        if paths.is_empty() {
            return Err(Error::invalid_argument("no shard to read"));
        }
        self.paths = paths.to_vec();
        let reader = self.open_shard(0)?;
        self.state = State::Active {
            shard_idx: 0,
            reader,
        };
        Ok(())
    }

    /// Opens a comma separated list of paths and `base@N` shard patterns.
    pub fn open_sharded_path(&mut self, sharded_path: &str) -> Result<()> {
        let paths = expand_sharded_path(sharded_path)?;
        self.open(&paths)
    }

    /// Reads the next record into `record`, moving across shard boundaries
    /// as needed. Returns false iff every shard is exhausted; once false,
    /// always false. After an error the reader is unusable.
    pub fn next(&mut self, record: &mut R::Record) -> Result<bool> {
        loop {
            let (shard_idx, result) = match &mut self.state {
                State::Unopened => {
                    return Err(Error::failed_precondition(
                        "next() on a sharded reader that was never opened",
                    ))
                }
                State::Exhausted => return Ok(false),
                State::Failed => {
                    return Err(Error::failed_precondition(
                        "next() on a sharded reader after a failure",
                    ))
                }
                State::Active { shard_idx, reader } => (*shard_idx, reader.next(record)),
            };
            match result {
                Ok(true) => return Ok(true),
                Ok(false) => self.advance(shard_idx)?,
                Err(error) => return Err(self.fail(shard_idx, error)),
            }
        }
    }

    /// Releases the open shard, if any. Later calls to `next` report end of
    /// stream.
    pub fn close(&mut self) -> Result<()> {
        match mem::replace(&mut self.state, State::Exhausted) {
            State::Active {
                shard_idx,
                mut reader,
            } => {
                reader.close()?;
                self.log_closed(shard_idx);
                Ok(())
            }
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    /// Index of the open shard.
    pub fn shard_index(&self) -> Option<usize> {
        match self.state {
            State::Active { shard_idx, .. } => Some(shard_idx),
            _ => None,
        }
    }

    pub fn num_shards(&self) -> usize {
        self.paths.len()
    }

    /// Closes shard `shard_idx`, which reported end of stream, and opens the
    /// following one if there is one.
    fn advance(&mut self, shard_idx: usize) -> Result<()> {
        if let State::Active { mut reader, .. } = mem::replace(&mut self.state, State::Exhausted)
        {
            if let Err(error) = reader.close() {
                return Err(self.fail(shard_idx, error));
            }
            self.log_closed(shard_idx);
        }
        let next_idx = shard_idx + 1;
        if next_idx == self.paths.len() {
            self.log(&format!("all {} shards read", self.paths.len()));
            return Ok(());
        }
        let reader = self.open_shard(next_idx)?;
        self.state = State::Active {
            shard_idx: next_idx,
            reader,
        };
        Ok(())
    }

    fn open_shard(&mut self, shard_idx: usize) -> Result<R> {
        self.log(&format!(
            "opening shard {} of {}: {}",
            shard_idx + 1,
            self.paths.len(),
            self.paths[shard_idx]
        ));
        R::open(&self.env, &self.paths[shard_idx], &self.options)
            .map_err(|error| self.fail(shard_idx, error))
    }

    fn log_closed(&self, shard_idx: usize) {
        self.log(&format!(
            "closed shard {} of {}",
            shard_idx + 1,
            self.paths.len()
        ));
    }

    fn fail(&mut self, shard_idx: usize, error: Error) -> Error {
        self.state = State::Failed;
        let error = error.with_context(&format!(
            "shard {} of {} ({})",
            shard_idx + 1,
            self.paths.len(),
            self.paths[shard_idx]
        ));
        self.log(&error.to_string());
        error
    }

    fn log(&self, info: &str) {
        if let Some(info_log) = &self.options.info_log {
            info_log.log(info);
        }
    }
}
