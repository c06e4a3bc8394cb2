//! Per-run log file
//!
//! [`RunLog`] is a `tracing-subscriber` writer whose target file can be
//! swapped while the subscriber is installed. The orchestrator opens it when
//! a run starts and closes it when the run ends; while no file is open,
//! writes are discarded.

use crate::registry::lock_unpoisoned;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Swappable log file sink
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    file: Arc<Mutex<Option<File>>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncates or creates `path` and directs all further output to it
    pub fn open(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        *lock_unpoisoned(&self.file) = Some(file);
        Ok(())
    }

    /// Flushes and detaches the current file
    pub fn close(&self) {
        if let Some(mut file) = lock_unpoisoned(&self.file).take() {
            let _ = file.flush();
        }
    }

    pub fn is_open(&self) -> bool {
        lock_unpoisoned(&self.file).is_some()
    }
}

/// Writer handed out per event
pub struct RunLogWriter {
    file: Arc<Mutex<Option<File>>>,
}

impl Write for RunLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match lock_unpoisoned(&self.file).as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match lock_unpoisoned(&self.file).as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RunLog {
    type Writer = RunLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RunLogWriter {
            file: Arc::clone(&self.file),
        }
    }
}
