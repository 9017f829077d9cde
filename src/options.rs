use std::{fmt, sync::Arc};

use crate::env::Logger;

/// Options controlling how record files are opened and read.
#[derive(Clone)]
pub struct ReadOptions {
    /// If true, formats that carry checksums verify them on every record.
    /// Default: true
    pub verify_checksums: bool,

    /// Shard transitions and failures are logged here if set.
    /// Default: None
    pub info_log: Option<Arc<dyn Logger>>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            info_log: None,
        }
    }
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("verify_checksums", &self.verify_checksums)
            .field("info_log", &self.info_log.is_some())
            .finish()
    }
}
