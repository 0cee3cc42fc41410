//! Append-only JSON Lines output
//!
//! One JSON object per line, one line per record. An existing file is
//! extended, never truncated. Every batch is flushed and synced before
//! `write_batch` returns.

use crate::extract::Record;
use crate::output::traits::{OutputError, OutputResult, RecordSink};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Appends records to a `.jsonl` file
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    file: File,

    /// The file may end mid-line (torn earlier write); start the next batch
    /// on a fresh line
    needs_newline: bool,
}

impl JsonlSink {
    /// Opens (or creates) the output file in append mode
    ///
    /// Missing parent directories are created.
    pub fn open(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| OutputError::io(path, e))?;

        let mut sink = Self {
            path: path.to_path_buf(),
            file,
            needs_newline: false,
        };
        sink.needs_newline = sink.ends_mid_line().map_err(|e| OutputError::io(path, e))?;
        if sink.needs_newline {
            tracing::warn!("{} ends with a partial line; appending after it", path.display());
        }
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the file is non-empty and its last byte is not a newline
    fn ends_mid_line(&mut self) -> std::io::Result<bool> {
        if self.file.metadata()?.len() == 0 {
            return Ok(false);
        }
        let mut last = [0u8; 1];
        self.file.seek(SeekFrom::End(-1))?;
        self.file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }
}

impl RecordSink for JsonlSink {
    fn write_batch(&mut self, records: &[Record]) -> OutputResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        // Serialize the whole batch first so a bad record writes nothing
        let mut buffer = String::new();
        if self.needs_newline {
            buffer.push('\n');
        }
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }

        let result = self
            .file
            .write_all(buffer.as_bytes())
            .and_then(|_| self.file.flush())
            .and_then(|_| self.file.sync_data());

        // A failed write may have left part of a line behind
        self.needs_newline = result.is_err();
        result.map_err(|e| OutputError::io(&self.path, e))?;

        Ok(records.len())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Reads all records from a JSON Lines file
///
/// Blank and malformed lines are skipped.
pub fn read_records(path: &Path) -> OutputResult<Vec<Record>> {
    let file = File::open(path).map_err(|e| OutputError::io(path, e))?;
    let mut records = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| OutputError::io(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::debug!("Skipping malformed line in {}: {}", path.display(), e),
        }
    }

    Ok(records)
}
