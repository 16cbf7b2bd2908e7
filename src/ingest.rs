//! Streaming one string field out of a newline-delimited JSON log.

use crate::error::{Error, Result};
use log::{debug, warn};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Field holding the client address in access log records.
pub const DEFAULT_FIELD: &str = "remote_addr";

/// Where to read records from and which field to extract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestConfig {
    pub path: PathBuf,
    pub field: String,
}

impl IngestConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            field: DEFAULT_FIELD.to_owned(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

/// Lazily yields the configured field of every record.
///
/// Lines that are not JSON objects, lack the field, or hold an empty or
/// non-string value are skipped. Invalid UTF-8 sequences are dropped from a
/// line before it is parsed. A read error ends the iteration and is kept for
/// [`finish`](Self::finish). The iterator is single pass; reopen the source
/// to read it again.
pub struct FieldReader<R> {
    reader: R,
    field: String,
    line: Vec<u8>,
    lines: usize,
    skipped: usize,
    error: Option<io::Error>,
    done: bool,
}

impl FieldReader<BufReader<File>> {
    pub fn open(config: &IngestConfig) -> Result<Self> {
        let file = File::open(&config.path).map_err(|source| Error::Io {
            path: config.path.clone(),
            source,
        })?;
        debug!("reading field {:?} from {}", config.field, config.path.display());
        Ok(Self::new(BufReader::new(file), config.field.clone()))
    }
}

impl<R: BufRead> FieldReader<R> {
    pub fn new(reader: R, field: impl Into<String>) -> Self {
        Self {
            reader,
            field: field.into(),
            line: Vec::new(),
            lines: 0,
            skipped: 0,
            error: None,
            done: false,
        }
    }

    /// Reports the read error that ended the iteration early, if any.
    pub fn finish(&mut self) -> Result<()> {
        match self.error.take() {
            Some(source) => Err(Error::Read {
                line: self.lines + 1,
                source,
            }),
            None => Ok(()),
        }
    }

    /// Number of lines read so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Number of lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn extract(&self) -> Option<String> {
        let text: String = self.line.utf8_chunks().map(|chunk| chunk.valid()).collect();
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(text).ok()?.get(&self.field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

impl<R: BufRead> Iterator for FieldReader<R> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    debug!("read {} lines, skipped {}", self.lines, self.skipped);
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("read error after {} lines: {err}", self.lines);
                    self.error = Some(err);
                    self.done = true;
                    return None;
                }
            }
            self.lines += 1;
            match self.extract() {
                Some(value) => return Some(value),
                None => self.skipped += 1,
            }
        }
    }
}
