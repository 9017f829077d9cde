use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Read, Write},
    sync::Mutex,
    thread,
};

use chrono::Local;

use super::{Env, Logger, SequentialFile, WritableFile};
use crate::util::{Error, Result};

const WRITABLE_FILE_BUFFER_SIZE: usize = 65536;

#[derive(Default)]
pub struct PosixEnv {}

impl PosixEnv {
    pub fn new() -> Self {
        Self {}
    }
}

impl Env for PosixEnv {
    fn new_sequential_file(&self, fname: &str) -> Result<Box<dyn SequentialFile>> {
        match File::open(fname) {
            Ok(file) => Ok(Box::new(PosixSequentialFile {
                file,
                filename: fname.to_owned(),
            })),
            Err(error) => Err(to_db_error(fname, error)),
        }
    }

    fn new_writable_file(&self, fname: &str) -> Result<Box<dyn WritableFile>> {
        match File::create(fname) {
            Ok(file) => Ok(Box::new(PosixWritableFile {
                file: Some(BufWriter::with_capacity(WRITABLE_FILE_BUFFER_SIZE, file)),
                filename: fname.to_owned(),
            })),
            Err(error) => Err(to_db_error(fname, error)),
        }
    }

    fn file_exists(&self, fname: &str) -> bool {
        fs::metadata(fname).is_ok()
    }

    fn get_file_size(&self, fname: &str) -> Result<u64> {
        match fs::metadata(fname) {
            Ok(data) => Ok(data.len()),
            Err(error) => Err(to_db_error(fname, error)),
        }
    }

    fn remove_file(&self, fname: &str) -> Result<()> {
        fs::remove_file(fname).map_err(|error| to_db_error(fname, error))
    }

    fn create_dir(&self, dname: &str) -> Result<()> {
        fs::create_dir(dname).map_err(|error| to_db_error(dname, error))
    }

    fn new_logger(&self, fname: &str) -> Result<Box<dyn Logger>> {
        match OpenOptions::new().create(true).append(true).open(fname) {
            Ok(file) => Ok(Box::new(PosixLogger::new(file))),
            Err(error) => Err(to_db_error(fname, error)),
        }
    }
}

fn to_db_error(target: &str, error: io::Error) -> Error {
    let msg = format!("{}: {}", target, &error.to_string());
    match error.kind() {
        io::ErrorKind::NotFound => Error::not_found(&msg),
        _ => Error::io_error(&msg),
    }
}

struct PosixSequentialFile {
    file: File,
    filename: String,
}

impl SequentialFile for PosixSequentialFile {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        loop {
            match self.file.read(dst) {
                Ok(n) => return Ok(n),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(to_db_error(&self.filename, error)),
            }
        }
    }
}

struct PosixWritableFile {
    /// None once closed.
    file: Option<BufWriter<File>>,
    filename: String,
}

impl PosixWritableFile {
    fn file(&mut self) -> Result<&mut BufWriter<File>> {
        match self.file.as_mut() {
            Some(file) => Ok(file),
            None => Err(Error::failed_precondition(&format!(
                "{}: file is closed",
                self.filename
            ))),
        }
    }
}

impl WritableFile for PosixWritableFile {
    fn append(&mut self, data: &[u8]) -> Result<()> {
        let filename = self.filename.clone();
        self.file()?
            .write_all(data)
            .map_err(|error| to_db_error(&filename, error))
    }

    fn close(&mut self) -> Result<()> {
        match self.file.take() {
            Some(mut file) => file
                .flush()
                .map_err(|error| to_db_error(&self.filename, error)),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        let filename = self.filename.clone();
        self.file()?
            .flush()
            .map_err(|error| to_db_error(&filename, error))
    }

    fn sync(&mut self) -> Result<()> {
        let filename = self.filename.clone();
        let file = self.file()?;
        file.flush()
            .and_then(|_| file.get_ref().sync_all())
            .map_err(|error| to_db_error(&filename, error))
    }
}

struct PosixLogger {
    file: Mutex<File>,
}

impl PosixLogger {
    fn new(file: File) -> Self {
        Self {
            file: Mutex::new(file),
        }
    }
}

impl Logger for PosixLogger {
    fn log(&self, info: &str) {
        // Record the time as close to the log() call as possible.
        let time = Local::now().format("%Y/%m/%d-%H:%M:%S%.6f").to_string();
        // Record the thread ID.
        let thread_id = thread::current().id();
        let mut info = format!("{} {:?} {}", time, thread_id, info);
        if !info.ends_with('\n') {
            info += "\n";
        }
        // Logging never fails the caller.
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(info.as_bytes());
            let _ = file.flush();
        }
    }
}
