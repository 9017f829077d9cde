use crate::util::Result;

mod posix_env;

pub use posix_env::PosixEnv;

/// An Env is the interface through which readers and writers reach the
/// operating system: opening files by path and creating info logs. Tests and
/// embedders may provide their own implementation.
///
/// All Env implementations are safe for concurrent access from
/// multiple threads without any external synchronization.
pub trait Env: Send + Sync {
    /// The returned file will only be accessed by one thread at a time.
    fn new_sequential_file(&self, fname: &str) -> Result<Box<dyn SequentialFile>>;

    /// Creates a new file, truncating any existing one. The returned file
    /// will only be accessed by one thread at a time.
    fn new_writable_file(&self, fname: &str) -> Result<Box<dyn WritableFile>>;

    fn file_exists(&self, fname: &str) -> bool;
    fn get_file_size(&self, fname: &str) -> Result<u64>;
    fn remove_file(&self, fname: &str) -> Result<()>;
    fn create_dir(&self, dname: &str) -> Result<()>;
    fn new_logger(&self, fname: &str) -> Result<Box<dyn Logger>>;
}

/// A file abstraction for reading sequentially through a file
pub trait SequentialFile {
    /// Reads up to `dst.len()` bytes into `dst` and returns how many were
    /// read. Returns 0 only at end of file.
    fn read(&mut self, dst: &mut [u8]) -> Result<usize>;
}

/// A file abstraction for sequential writing.  The implementation
/// must provide buffering since callers may append small fragments
/// at a time to the file.
pub trait WritableFile {
    fn append(&mut self, data: &[u8]) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn sync(&mut self) -> Result<()>;
}

pub trait Logger: Send + Sync {
    fn log(&self, info: &str);
}

impl<T: SequentialFile + ?Sized> SequentialFile for &mut T {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        (**self).read(dst)
    }
}

impl<T: SequentialFile + ?Sized> SequentialFile for Box<T> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        (**self).read(dst)
    }
}

impl<T: WritableFile + ?Sized> WritableFile for &mut T {
    fn append(&mut self, data: &[u8]) -> Result<()> {
        (**self).append(data)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn sync(&mut self) -> Result<()> {
        (**self).sync()
    }
}

impl<T: WritableFile + ?Sized> WritableFile for Box<T> {
    fn append(&mut self, data: &[u8]) -> Result<()> {
        (**self).append(data)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn sync(&mut self) -> Result<()> {
        (**self).sync()
    }
}

/// Reads until `dst` is full or the file is exhausted. Returns the number of
/// bytes read, which is smaller than `dst.len()` only at end of file.
pub fn read_fully<F: SequentialFile + ?Sized>(file: &mut F, dst: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < dst.len() {
        let n = file.read(&mut dst[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Payloads are read in pieces of at most this size, so a corrupted length
/// cannot force a huge allocation before the truncation shows up.
const READ_CHUNK_SIZE: usize = 1 << 20;

/// Replaces the content of `dst` with the next `length` bytes of `file`.
/// Returns false if the file ends first; `dst` then holds what was read.
pub fn read_to_vec<F: SequentialFile + ?Sized>(
    file: &mut F,
    length: usize,
    dst: &mut Vec<u8>,
) -> Result<bool> {
    dst.clear();
    while dst.len() < length {
        let start = dst.len();
        let chunk = (length - start).min(READ_CHUNK_SIZE);
        dst.resize(start + chunk, 0);
        let read = read_fully(file, &mut dst[start..])?;
        if read < chunk {
            dst.truncate(start + read);
            return Ok(false);
        }
    }
    Ok(true)
}
